use thiserror::Error;
use unified_csrf_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum CsrfError {
    /// Deployment misconfiguration. Fatal for the request, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid authenticity token")]
    InvalidAuthenticityToken,
}

impl CsrfError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, CsrfError::Configuration(_))
    }
}

impl From<CsrfError> for CoreError {
    fn from(err: CsrfError) -> Self {
        match err {
            CsrfError::Configuration(msg) => CoreError::Configuration(msg),
            CsrfError::InvalidAuthenticityToken => {
                CoreError::UnprocessableEntity("Invalid authenticity token".to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_is_distinguishable() {
        assert!(CsrfError::Configuration("no key".into()).is_configuration());
        assert!(!CsrfError::InvalidAuthenticityToken.is_configuration());
    }

    #[test]
    fn test_core_error_mapping() {
        let err: CoreError = CsrfError::Configuration("no key".into()).into();
        assert_eq!(err.status_code(), 500);

        let err: CoreError = CsrfError::InvalidAuthenticityToken.into();
        assert_eq!(err.status_code(), 422);
    }
}
