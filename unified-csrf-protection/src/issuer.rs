use crate::config::{AUTHENTICITY_TOKEN_LENGTH, CHECKSUM_COOKIE_NAME, TOKEN_COOKIE_NAME};
use crate::context::CsrfContext;
use crate::error::{CsrfError, Result};
use crate::token::TokenCrypto;
use tracing::debug;
use unified_csrf_core::HttpRequest;

/// Token and checksum as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookiePair {
    pub token: Option<String>,
    pub checksum: Option<String>,
}

impl CookiePair {
    pub fn from_request(request: &HttpRequest) -> Self {
        let mut cookies = request.cookies();
        Self {
            token: cookies.remove(TOKEN_COOKIE_NAME),
            checksum: cookies.remove(CHECKSUM_COOKIE_NAME),
        }
    }
}

/// Decides per request whether the client's token is reused or replaced
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    crypto: TokenCrypto,
}

impl TokenIssuer {
    pub fn new(crypto: TokenCrypto) -> Self {
        Self { crypto }
    }

    pub fn crypto(&self) -> &TokenCrypto {
        &self.crypto
    }

    /// Whether a cookie pair can be kept as the current token
    ///
    /// The checksum must validate and the token must be the standard number
    /// of characters long; a validly signed token of another length is
    /// replaced.
    pub fn is_reusable(&self, cookies: &CookiePair) -> Result<bool> {
        let valid = self
            .crypto
            .valid_token(cookies.token.as_deref(), cookies.checksum.as_deref())?;
        Ok(valid
            && cookies
                .token
                .as_ref()
                .is_some_and(|token| token.chars().count() == AUTHENTICITY_TOKEN_LENGTH))
    }

    /// Current token for the request, computed once per request
    ///
    /// Reuses the cookie token when possible. Otherwise mints a new token
    /// and records it in the request's [`CsrfContext`] for the cookie
    /// emitter; minting without that context is a configuration error.
    pub fn current_token(&self, request: &HttpRequest) -> Result<String> {
        let context = CsrfContext::of(request);
        if let Some(token) = context.and_then(CsrfContext::current_token) {
            return Ok(token.to_string());
        }

        let cookies = CookiePair::from_request(request);
        let reusable = self.is_reusable(&cookies)?;
        let token = match cookies.token {
            Some(token) if reusable => {
                debug!(path = %request.path, "Reusing CSRF token from cookies");
                token
            }
            _ => {
                let context = context.ok_or_else(|| {
                    CsrfError::Configuration(
                        "CsrfCookieMiddleware must be installed to issue CSRF tokens".to_string(),
                    )
                })?;
                let token = self.crypto.generate_token();
                context.record_minted(token.clone());
                debug!(path = %request.path, "Minted new CSRF token");
                token
            }
        };

        Ok(match context {
            Some(context) => context.remember_current(token).to_string(),
            None => token,
        })
    }
}
