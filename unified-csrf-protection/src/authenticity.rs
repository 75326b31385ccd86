//! Ordered authenticity checks for submitted tokens.
//!
//! A submitted token is authentic when any checker in the
//! [`AuthenticityVerifier`] accepts it. The default order is:
//!
//! 1. [`CrossAppChecker`] - the submitted token validates against the
//!    checksum cookie under the shared secret. This accepts tokens rendered
//!    by any cooperating application of the trust domain.
//! 2. [`MaskedTokenChecker`] - the submitted value unmasks to the current
//!    token of this request (the classic same-application double submit).

use crate::error::Result;
use crate::masking::unmask_token;
use crate::token::TokenCrypto;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Request state a checker may inspect
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub cookie_token: Option<&'a str>,
    pub cookie_checksum: Option<&'a str>,
    /// Token issued for this request (reused or freshly minted)
    pub current_token: &'a str,
}

/// A single way of accepting a submitted token
pub trait AuthenticityChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(false)` means "not accepted by this checker"; errors abort
    fn is_authentic(&self, submitted: &str, ctx: &CheckContext<'_>) -> Result<bool>;
}

/// Accepts tokens bound to the checksum cookie by the shared secret
#[derive(Debug, Clone)]
pub struct CrossAppChecker {
    crypto: TokenCrypto,
}

impl CrossAppChecker {
    pub fn new(crypto: TokenCrypto) -> Self {
        Self { crypto }
    }
}

impl AuthenticityChecker for CrossAppChecker {
    fn name(&self) -> &'static str {
        "cross_app"
    }

    fn is_authentic(&self, submitted: &str, ctx: &CheckContext<'_>) -> Result<bool> {
        self.crypto.valid_token(Some(submitted), ctx.cookie_checksum)
    }
}

/// Accepts masked or raw standard-base64 tokens that unmask to the
/// current token
#[derive(Debug, Clone)]
pub struct MaskedTokenChecker {
    crypto: TokenCrypto,
}

impl MaskedTokenChecker {
    pub fn new(crypto: TokenCrypto) -> Self {
        Self { crypto }
    }
}

impl AuthenticityChecker for MaskedTokenChecker {
    fn name(&self) -> &'static str {
        "masked_token"
    }

    fn is_authentic(&self, submitted: &str, ctx: &CheckContext<'_>) -> Result<bool> {
        let Some(raw) = unmask_token(submitted) else {
            return Ok(false);
        };

        if bool::from(raw.ct_eq(ctx.current_token.as_bytes())) {
            return Ok(true);
        }

        // The real token of this system is the checksum-bound one
        match std::str::from_utf8(&raw) {
            Ok(unmasked) => self.crypto.valid_token(Some(unmasked), ctx.cookie_checksum),
            Err(_) => Ok(false),
        }
    }
}

/// Tries each checker in order; the first acceptance wins
#[derive(Clone)]
pub struct AuthenticityVerifier {
    checkers: Vec<Arc<dyn AuthenticityChecker>>,
}

impl AuthenticityVerifier {
    /// Verifier with no checkers; rejects everything
    pub fn empty() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    /// Cross-application check first, then the masked double submit
    pub fn new(crypto: TokenCrypto) -> Self {
        Self::empty()
            .with_checker(CrossAppChecker::new(crypto.clone()))
            .with_checker(MaskedTokenChecker::new(crypto))
    }

    /// Append a checker after the existing ones
    pub fn with_checker<C: AuthenticityChecker + 'static>(mut self, checker: C) -> Self {
        self.checkers.push(Arc::new(checker));
        self
    }

    pub fn checker_names(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }

    /// Whether any submitted candidate is accepted by any checker
    pub fn verify<'s, I>(&self, candidates: I, ctx: &CheckContext<'_>) -> Result<bool>
    where
        I: IntoIterator<Item = &'s str>,
    {
        for submitted in candidates {
            for checker in &self.checkers {
                if checker.is_authentic(submitted, ctx)? {
                    debug!(checker = checker.name(), "Authenticity token accepted");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for AuthenticityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticityVerifier")
            .field("checkers", &self.checker_names())
            .finish()
    }
}
