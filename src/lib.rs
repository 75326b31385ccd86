// Unified CSRF prevention for applications sharing a trust domain
//
// Re-exports the request pipeline primitives and the token issuance and
// verification core.

pub use unified_csrf_core;
pub use unified_csrf_protection;

pub use unified_csrf_core::logging;

// Prelude for common imports
pub mod prelude {
    pub use unified_csrf_core::{
        handler, Error, HandlerFn, HttpRequest, HttpResponse, Middleware, MiddlewareChain, Next,
    };
    pub use unified_csrf_protection::{
        csrf_token, hidden_field, masked_authenticity_token, meta_tags, AuthenticityChecker,
        CheckContext, CsrfConfig, CsrfCookieMiddleware, CsrfError, Environment,
        ForgeryProtection, SecretSource, TokenCrypto, TokenIssuer, CHECKSUM_COOKIE_NAME,
        TOKEN_COOKIE_NAME,
    };
}

use unified_csrf_core::MiddlewareChain;
use unified_csrf_protection::{CsrfConfig, CsrfCookieMiddleware, ForgeryProtection};

/// Chain with the cookie middleware outside the forgery protection
///
/// Further middleware added to the returned chain run inside both.
pub fn csrf_chain(config: CsrfConfig) -> MiddlewareChain {
    MiddlewareChain::new()
        .with(CsrfCookieMiddleware::new(config.clone()))
        .with(ForgeryProtection::new(config))
}
