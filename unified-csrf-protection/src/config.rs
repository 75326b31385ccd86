use crate::error::{CsrfError, Result};
use parking_lot::RwLock;
use std::env;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cookie carrying the plain token, readable by client scripts
pub const TOKEN_COOKIE_NAME: &str = "csrf_token";

/// HttpOnly cookie carrying the HMAC checksum of the token
pub const CHECKSUM_COOKIE_NAME: &str = "csrf_checksum";

/// Length of an authenticity token, in characters
pub const AUTHENTICITY_TOKEN_LENGTH: usize = 32;

/// Identifier of the request-scoped slot holding a freshly minted token
pub const TOKEN_SLOT_KEY: &str = "unified_csrf_prevention.token";

/// Environment variable holding the shared secret
pub const SECRET_ENV_VAR: &str = "UNIFIED_CSRF_PREVENTION_KEY";

/// Environment variable naming the deployment tier
pub const ENVIRONMENT_ENV_VAR: &str = "APP_ENV";

/// Secret shared by every application of the trust domain
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Handle to the configured shared secret
///
/// Clones share the same cell, so replacing the secret through any handle
/// is observed by every component on its next checksum computation.
#[derive(Clone, Default)]
pub struct SecretSource {
    inner: Arc<RwLock<Option<SharedSecret>>>,
}

impl SecretSource {
    /// Source with no secret configured
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        let source = Self::empty();
        source.set(secret);
        source
    }

    /// Replace the secret (hot reload)
    pub fn set(&self, secret: impl Into<Vec<u8>>) {
        *self.inner.write() = Some(SharedSecret::new(secret));
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    pub fn is_configured(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Current secret, or a configuration error if none is set
    pub fn current(&self) -> Result<SharedSecret> {
        self.inner.read().clone().ok_or_else(|| {
            CsrfError::Configuration(format!(
                "shared secret is not configured (set {})",
                SECRET_ENV_VAR
            ))
        })
    }
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSource")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Deployment tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Preview,
    Staging,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "test" => Some(Environment::Test),
            "preview" => Some(Environment::Preview),
            "staging" => Some(Environment::Staging),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Whether cookies must carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        matches!(
            self,
            Environment::Production | Environment::Preview | Environment::Staging
        )
    }
}

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// CSRF prevention configuration
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Shared secret, read at every checksum computation
    pub secret: SecretSource,

    /// Deployment tier, controls the `Secure` cookie attribute
    pub environment: Environment,

    /// Header carrying a submitted token
    pub header_name: String,

    /// Form field carrying a submitted token
    pub field_name: String,

    /// Cookie path
    pub cookie_path: String,

    /// Cookie SameSite policy
    pub cookie_same_site: SameSite,

    /// Safe HTTP methods (not checked for forgery)
    pub safe_methods: Vec<String>,

    /// Paths to exclude from forgery checks
    pub exclude_paths: Vec<String>,
}

impl CsrfConfig {
    /// Create a configuration around a shared secret source
    pub fn new(secret: SecretSource) -> Self {
        Self {
            secret,
            environment: Environment::default(),
            header_name: "X-CSRF-Token".to_string(),
            field_name: "authenticity_token".to_string(),
            cookie_path: "/".to_string(),
            cookie_same_site: SameSite::Strict,
            safe_methods: vec![
                "GET".to_string(),
                "HEAD".to_string(),
                "OPTIONS".to_string(),
            ],
            exclude_paths: Vec::new(),
        }
    }

    /// Create a configuration with a fixed shared secret
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(SecretSource::new(secret))
    }

    /// Load from the process environment, reading `.env` first when present
    ///
    /// A missing secret is not an error here; checksum computation fails
    /// with a configuration error until one is provided.
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_ok() {
            debug!("Loaded .env file");
        }

        let secret = match env::var(SECRET_ENV_VAR) {
            Ok(value) if !value.is_empty() => SecretSource::new(value),
            _ => {
                warn!(variable = SECRET_ENV_VAR, "CSRF shared secret is not set");
                SecretSource::empty()
            }
        };

        let environment = env::var(ENVIRONMENT_ENV_VAR)
            .ok()
            .and_then(|value| Environment::parse(&value))
            .unwrap_or_default();

        Self::new(secret).with_environment(environment)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    pub fn with_safe_methods(mut self, methods: Vec<String>) -> Self {
        self.safe_methods = methods;
        self
    }

    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    /// Whether cookies carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.environment.secure_cookies()
    }
}
