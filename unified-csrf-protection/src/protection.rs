use crate::authenticity::{AuthenticityChecker, AuthenticityVerifier, CheckContext};
use crate::config::CsrfConfig;
use crate::error::CsrfError;
use crate::issuer::{CookiePair, TokenIssuer};
use crate::token::TokenCrypto;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use unified_csrf_core::{Error, HttpRequest, HttpResponse, Middleware, Next};

/// Request-side forgery protection
///
/// Resolves the current token before the handler runs, so every response
/// (including plain page views) can carry fresh cookies, then verifies
/// state-changing requests. Install it inside a
/// [`CsrfCookieMiddleware`](crate::CsrfCookieMiddleware).
#[derive(Clone)]
pub struct ForgeryProtection {
    config: Arc<CsrfConfig>,
    issuer: TokenIssuer,
    verifier: AuthenticityVerifier,
}

impl ForgeryProtection {
    pub fn new(config: CsrfConfig) -> Self {
        let crypto = TokenCrypto::new(config.secret.clone());
        Self {
            config: Arc::new(config),
            issuer: TokenIssuer::new(crypto.clone()),
            verifier: AuthenticityVerifier::new(crypto),
        }
    }

    /// Append a checker consulted after the built-in ones
    pub fn with_checker<C: AuthenticityChecker + 'static>(mut self, checker: C) -> Self {
        self.verifier = self.verifier.with_checker(checker);
        self
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Check if request needs forgery protection
    pub fn needs_protection(&self, request: &HttpRequest) -> bool {
        let method = request.method.to_uppercase();
        if self.config.safe_methods.iter().any(|m| m.eq_ignore_ascii_case(&method)) {
            return false;
        }

        !self
            .config
            .exclude_paths
            .iter()
            .any(|excluded| request.path.starts_with(excluded.as_str()))
    }

    /// Tokens submitted with the request, form field first
    pub fn submitted_tokens(&self, request: &HttpRequest) -> Vec<String> {
        let mut tokens = Vec::with_capacity(2);

        if let Some(token) = request.form_param(&self.config.field_name) {
            tokens.push(token);
        }
        if let Some(token) = request.header(&self.config.header_name) {
            tokens.push(token.to_string());
        }

        tokens
    }

    /// Whether the request is allowed through
    ///
    /// Issues the current token as a side effect. Errors are configuration
    /// errors only; a forged request yields `Ok(false)`.
    pub fn verified_request(&self, request: &HttpRequest) -> Result<bool, CsrfError> {
        let current = self.issuer.current_token(request)?;

        if !self.needs_protection(request) {
            return Ok(true);
        }

        let cookies = CookiePair::from_request(request);
        let ctx = CheckContext {
            cookie_token: cookies.token.as_deref(),
            cookie_checksum: cookies.checksum.as_deref(),
            current_token: &current,
        };
        let submitted = self.submitted_tokens(request);

        self.verifier
            .verify(submitted.iter().map(String::as_str), &ctx)
    }
}

#[async_trait]
impl Middleware for ForgeryProtection {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        if !self.verified_request(&req)? {
            warn!(
                method = %req.method,
                path = %req.path,
                "Rejected request with invalid authenticity token"
            );
            return Ok(HttpResponse::unprocessable_entity()
                .with_body(CsrfError::InvalidAuthenticityToken.to_string().into_bytes()));
        }

        next(req).await
    }
}
