use crate::config::{CsrfConfig, CHECKSUM_COOKIE_NAME, TOKEN_COOKIE_NAME, TOKEN_SLOT_KEY};
use crate::context::CsrfContext;
use crate::error::CsrfError;
use crate::token::TokenCrypto;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use unified_csrf_core::{Error, HttpRequest, HttpResponse, Middleware, Next};

/// Response-side middleware that sets the token and checksum cookies
///
/// Must wrap every middleware and handler that may issue a token. It
/// attaches a fresh [`CsrfContext`] to each request and, once the response
/// is ready, emits the cookie pair if a token was minted along the way.
#[derive(Clone)]
pub struct CsrfCookieMiddleware {
    config: Arc<CsrfConfig>,
    crypto: TokenCrypto,
}

impl CsrfCookieMiddleware {
    pub fn new(config: CsrfConfig) -> Self {
        let crypto = TokenCrypto::new(config.secret.clone());
        Self {
            config: Arc::new(config),
            crypto,
        }
    }

    /// Append both cookies for a token to the response
    pub fn set_csrf_cookies(
        &self,
        response: &mut HttpResponse,
        token: &str,
    ) -> Result<(), CsrfError> {
        let checksum = self.crypto.checksum_for(token)?;

        response.append_cookie(self.cookie(TOKEN_COOKIE_NAME, token, false));
        response.append_cookie(self.cookie(CHECKSUM_COOKIE_NAME, &checksum, true));
        Ok(())
    }

    fn cookie(&self, name: &str, value: &str, http_only: bool) -> String {
        let mut cookie = format!("{}={}; Path={}", name, value, self.config.cookie_path);

        if self.config.secure_cookies() {
            cookie.push_str("; Secure");
        }

        if http_only {
            cookie.push_str("; HttpOnly");
        }

        cookie.push_str(&format!(
            "; SameSite={}",
            self.config.cookie_same_site.as_str()
        ));
        cookie
    }
}

#[async_trait]
impl Middleware for CsrfCookieMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let context = Arc::new(CsrfContext::new());
        req.extensions.insert_arc(context.clone());

        let mut response = next(req).await?;

        if let Some(token) = context.minted_token() {
            self.set_csrf_cookies(&mut response, token)?;
            info!(token = %token, slot = %TOKEN_SLOT_KEY, "Set CSRF token");
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use parking_lot::Mutex;
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;
    use unified_csrf_core::{handler, MiddlewareChain};

    /// Log sink shared with the test subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    fn middleware(environment: Environment) -> CsrfCookieMiddleware {
        CsrfCookieMiddleware::new(
            CsrfConfig::with_secret("a shared secret key").with_environment(environment),
        )
    }

    async fn run(middleware: CsrfCookieMiddleware, token: Option<&'static str>) -> HttpResponse {
        let chain = MiddlewareChain::new().with(middleware);
        chain
            .apply(
                HttpRequest::new("GET", "/what-ever"),
                handler(move |req| async move {
                    if let Some(token) = token {
                        CsrfContext::of(&req)
                            .expect("context attached")
                            .record_minted(token.to_string());
                    }
                    Ok(HttpResponse::ok().with_body(b"some body".to_vec()))
                }),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_token_no_cookies() {
        let response = run(middleware(Environment::Production), None).await;
        assert_eq!(response.status, 200);
        assert!(response.cookies.is_empty());
        assert!(!response.headers.contains_key("Set-Cookie"));
    }

    #[tokio::test]
    async fn test_secure_cookies_in_production_like_tiers() {
        for environment in [
            Environment::Production,
            Environment::Preview,
            Environment::Staging,
        ] {
            let mw = middleware(environment);
            let checksum = mw.crypto.checksum_for("token").unwrap();
            let response = run(mw, Some("token")).await;

            assert_eq!(response.status, 200);
            assert_eq!(
                response.cookie(TOKEN_COOKIE_NAME),
                Some("csrf_token=token; Path=/; Secure; SameSite=Strict")
            );
            assert_eq!(
                response.cookie(CHECKSUM_COOKIE_NAME),
                Some(
                    format!(
                        "csrf_checksum={}; Path=/; Secure; HttpOnly; SameSite=Strict",
                        checksum
                    )
                    .as_str()
                )
            );
        }
    }

    #[tokio::test]
    async fn test_insecure_cookies_elsewhere() {
        for environment in [Environment::Development, Environment::Test] {
            let mw = middleware(environment);
            let checksum = mw.crypto.checksum_for("token").unwrap();
            let response = run(mw, Some("token")).await;

            assert_eq!(
                response.cookie(TOKEN_COOKIE_NAME),
                Some("csrf_token=token; Path=/; SameSite=Strict")
            );
            assert_eq!(
                response.cookie(CHECKSUM_COOKIE_NAME),
                Some(
                    format!("csrf_checksum={}; Path=/; HttpOnly; SameSite=Strict", checksum)
                        .as_str()
                )
            );
        }
    }

    #[tokio::test]
    async fn test_minted_token_is_logged() {
        let (logs, _guard) = capture_logs();

        run(middleware(Environment::Production), Some("a-minted-token")).await;

        let output = logs.contents();
        assert!(output.contains("Set CSRF token"));
        assert!(output.contains("token=a-minted-token"));
        assert!(output.contains("slot=unified_csrf_prevention.token"));
    }

    #[tokio::test]
    async fn test_reused_token_is_not_logged() {
        let (logs, _guard) = capture_logs();

        run(middleware(Environment::Production), None).await;

        assert!(!logs.contents().contains("Set CSRF token"));
    }

    #[tokio::test]
    async fn test_missing_secret_fails_the_request() {
        let mw = CsrfCookieMiddleware::new(CsrfConfig::new(crate::SecretSource::empty()));
        let chain = MiddlewareChain::new().with(mw);

        let result = chain
            .apply(
                HttpRequest::new("GET", "/"),
                handler(|req| async move {
                    CsrfContext::of(&req)
                        .expect("context attached")
                        .record_minted("token".to_string());
                    Ok(HttpResponse::ok())
                }),
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.status_code(), 500);
    }
}
