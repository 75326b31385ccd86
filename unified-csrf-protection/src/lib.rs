//! # Unified CSRF Prevention
//!
//! Cross-application Cross-Site Request Forgery protection for a family of
//! independently deployed applications that share one trust domain.
//!
//! ## Features
//!
//! - ✅ **Shared-secret tokens** - HMAC-SHA256 checksum binds each token to a secret
//!   known to every cooperating application
//! - ✅ **Stateless** - the client holds the token/checksum cookie pair; nothing is stored
//! - ✅ **Cross-application acceptance** - a token rendered by one application is
//!   accepted by any other application of the trust domain
//! - ✅ **Ordered checkers** - cross-application check first, then the classic
//!   masked double submit, plus any custom checker
//! - ✅ **Hot-reloadable secret** - the secret is read on every checksum computation
//!
//! ## Token primitives
//!
//! ```rust
//! use unified_csrf_protection::{SecretSource, TokenCrypto};
//!
//! let crypto = TokenCrypto::new(SecretSource::new("much secure"));
//!
//! let checksum = crypto.checksum_for("such protect").unwrap();
//! assert_eq!(checksum, "fEFyEXot47K5knjFe7MB-CKW4q99a7BmP9rKwrxf9Qk");
//!
//! let token = crypto.generate_token();
//! assert_eq!(token.len(), 32);
//! let checksum = crypto.checksum_for(&token).unwrap();
//! assert!(crypto.valid_token(Some(&token), Some(&checksum)).unwrap());
//! assert!(!crypto.valid_token(Some(&token), None).unwrap());
//! ```
//!
//! ## Middleware
//!
//! The cookie middleware must be the outer one: it creates the request
//! context the forgery protection writes a minted token into, and sets the
//! cookies once the response exists.
//!
//! ```rust
//! use unified_csrf_core::{handler, HttpRequest, HttpResponse, MiddlewareChain};
//! use unified_csrf_protection::{
//!     CsrfConfig, CsrfCookieMiddleware, Environment, ForgeryProtection,
//! };
//!
//! # tokio_test::block_on(async {
//! let config = CsrfConfig::with_secret("much secure").with_environment(Environment::Production);
//!
//! let chain = MiddlewareChain::new()
//!     .with(CsrfCookieMiddleware::new(config.clone()))
//!     .with(ForgeryProtection::new(config));
//!
//! let response = chain
//!     .apply(
//!         HttpRequest::new("GET", "/form"),
//!         handler(|_req| async { Ok(HttpResponse::ok()) }),
//!     )
//!     .await
//!     .unwrap();
//!
//! // First visit: a token was minted and both cookies are set
//! assert!(response.cookie("csrf_token").unwrap().contains("Secure"));
//! assert!(response.cookie("csrf_checksum").unwrap().contains("HttpOnly"));
//! # });
//! ```

pub mod authenticity;
pub mod config;
pub mod context;
pub mod error;
pub mod issuer;
pub mod masking;
pub mod middleware;
pub mod protection;
pub mod token;
pub mod view;

pub use authenticity::{
    AuthenticityChecker, AuthenticityVerifier, CheckContext, CrossAppChecker, MaskedTokenChecker,
};
pub use config::{
    CsrfConfig, Environment, SameSite, SecretSource, SharedSecret, AUTHENTICITY_TOKEN_LENGTH,
    CHECKSUM_COOKIE_NAME, TOKEN_COOKIE_NAME, TOKEN_SLOT_KEY,
};
pub use context::CsrfContext;
pub use error::{CsrfError, Result};
pub use issuer::{CookiePair, TokenIssuer};
pub use middleware::CsrfCookieMiddleware;
pub use protection::ForgeryProtection;
pub use token::TokenCrypto;
pub use view::{csrf_token, hidden_field, masked_authenticity_token, meta_tags};
