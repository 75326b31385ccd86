use crate::config::TOKEN_SLOT_KEY;
use std::fmt;
use std::sync::OnceLock;
use unified_csrf_core::HttpRequest;

/// Request-scoped hand-off between the token issuer and the cookie emitter
///
/// [`CsrfCookieMiddleware`](crate::CsrfCookieMiddleware) creates one per
/// request and stores it in the request extensions. The issuer memoizes the
/// current token in it and records a minted token, which the emitter turns
/// into cookies once the response is ready. Both cells are write-once.
#[derive(Default)]
pub struct CsrfContext {
    current: OnceLock<String>,
    minted: OnceLock<String>,
}

impl CsrfContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context attached to a request, if the emitter is installed
    pub fn of(request: &HttpRequest) -> Option<&CsrfContext> {
        request.extensions.get::<CsrfContext>()
    }

    /// Memoized current token
    pub fn current_token(&self) -> Option<&str> {
        self.current.get().map(String::as_str)
    }

    /// Token minted during this request, awaiting cookie emission
    pub fn minted_token(&self) -> Option<&str> {
        self.minted.get().map(String::as_str)
    }

    /// Returns the token that ended up memoized
    pub(crate) fn remember_current(&self, token: String) -> &str {
        self.current.get_or_init(|| token)
    }

    /// Returns false if a token was already minted for this request
    pub(crate) fn record_minted(&self, token: String) -> bool {
        self.minted.set(token).is_ok()
    }
}

impl fmt::Debug for CsrfContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfContext")
            .field("current", &self.current.get().is_some())
            .field(TOKEN_SLOT_KEY, &self.minted.get().is_some())
            .finish()
    }
}
