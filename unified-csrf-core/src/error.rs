// Error types for the request pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Deployment misconfiguration; never caused by user input
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),
}

impl Error {
    /// HTTP status code of the response this error aborts into
    pub fn status_code(&self) -> u16 {
        match self {
            Error::UnprocessableEntity(_) => 422,
            Error::Configuration(_) | Error::Internal(_) => 500,
        }
    }
}
