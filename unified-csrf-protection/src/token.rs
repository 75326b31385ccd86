use crate::config::{SecretSource, AUTHENTICITY_TOKEN_LENGTH};
use crate::error::{CsrfError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Token generation and checksum verification against the shared secret
///
/// Checksums are `base64url(HMAC-SHA256(secret, token))` without padding.
/// Every application of a trust domain must produce identical checksums,
/// so this encoding is part of the wire contract.
#[derive(Debug, Clone)]
pub struct TokenCrypto {
    secret: SecretSource,
}

impl TokenCrypto {
    pub fn new(secret: SecretSource) -> Self {
        Self { secret }
    }

    /// Generate a fresh URL-safe token of [`AUTHENTICITY_TOKEN_LENGTH`] characters
    pub fn generate_token(&self) -> String {
        // base64 spends four characters per three bytes
        let bytes_needed = (AUTHENTICITY_TOKEN_LENGTH * 3).div_ceil(4);
        let mut random_bytes = vec![0u8; bytes_needed];
        OsRng.fill_bytes(&mut random_bytes);

        let mut token = URL_SAFE_NO_PAD.encode(random_bytes);
        token.truncate(AUTHENTICITY_TOKEN_LENGTH);
        token
    }

    /// Compute the checksum of a token
    ///
    /// Fails with [`CsrfError::Configuration`] when no secret is configured.
    pub fn checksum_for(&self, token: &str) -> Result<String> {
        let secret = self.secret.current()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| CsrfError::Configuration(format!("unusable shared secret: {}", e)))?;
        mac.update(token.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Check a token against its checksum in constant time
    ///
    /// Missing input is an ordinary first-visit situation and yields
    /// `Ok(false)`; only a configuration problem is an error.
    pub fn valid_token(&self, token: Option<&str>, checksum: Option<&str>) -> Result<bool> {
        let (Some(token), Some(checksum)) = (token, checksum) else {
            return Ok(false);
        };

        let expected = self.checksum_for(token)?;
        Ok(expected.as_bytes().ct_eq(checksum.as_bytes()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto(secret: &str) -> TokenCrypto {
        TokenCrypto::new(SecretSource::new(secret))
    }

    #[test]
    fn test_generated_token_shape() {
        let crypto = crypto("a shared secret key");
        for _ in 0..64 {
            let token = crypto.generate_token();
            assert_eq!(token.len(), AUTHENTICITY_TOKEN_LENGTH);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_generated_tokens_differ() {
        let crypto = crypto("a shared secret key");
        assert_ne!(crypto.generate_token(), crypto.generate_token());
    }

    #[test]
    fn test_generation_needs_no_secret() {
        let crypto = TokenCrypto::new(SecretSource::empty());
        assert_eq!(crypto.generate_token().len(), AUTHENTICITY_TOKEN_LENGTH);
    }

    #[test]
    fn test_reference_checksum() {
        let checksum = crypto("much secure").checksum_for("such protect").unwrap();
        assert_eq!(checksum, "fEFyEXot47K5knjFe7MB-CKW4q99a7BmP9rKwrxf9Qk");
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let crypto = crypto("a shared secret key");
        let token = crypto.generate_token();
        assert_eq!(
            crypto.checksum_for(&token).unwrap(),
            crypto.checksum_for(&token).unwrap()
        );
    }

    #[test]
    fn test_checksum_shape() {
        let checksum = crypto("a shared secret key").checksum_for("a token").unwrap();
        assert_eq!(checksum.len(), 43);
        assert!(!checksum.contains('='));
    }

    #[test]
    fn test_checksum_depends_on_secret() {
        let a = crypto("secret a").checksum_for("a token").unwrap();
        let b = crypto("secret b").checksum_for("a token").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let crypto = TokenCrypto::new(SecretSource::empty());
        assert!(crypto.checksum_for("a token").unwrap_err().is_configuration());
        assert!(crypto
            .valid_token(Some("a token"), Some("a checksum"))
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_missing_input_is_invalid() {
        let crypto = crypto("a shared secret key");
        let checksum = crypto.checksum_for("a token").unwrap();

        assert!(!crypto.valid_token(None, Some(&checksum)).unwrap());
        assert!(!crypto.valid_token(Some("a token"), None).unwrap());
        assert!(!crypto.valid_token(None, None).unwrap());
    }

    #[test]
    fn test_missing_input_short_circuits_before_secret() {
        let crypto = TokenCrypto::new(SecretSource::empty());
        assert!(!crypto.valid_token(None, Some("a checksum")).unwrap());
    }

    #[test]
    fn test_valid_pair() {
        let crypto = crypto("a shared secret key");
        let token = crypto.generate_token();
        let checksum = crypto.checksum_for(&token).unwrap();
        assert!(crypto.valid_token(Some(&token), Some(&checksum)).unwrap());
    }

    #[test]
    fn test_any_bit_flip_is_rejected() {
        let crypto = crypto("a shared secret key");
        let token = crypto.generate_token();
        let checksum = crypto.checksum_for(&token).unwrap().into_bytes();

        for i in 0..checksum.len() {
            for bit in 0..8 {
                let mut tampered = checksum.clone();
                tampered[i] ^= 1 << bit;
                let tampered = String::from_utf8_lossy(&tampered).into_owned();
                assert!(!crypto.valid_token(Some(&token), Some(&tampered)).unwrap());
            }
        }
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let crypto = crypto("a shared secret key");
        let checksum = crypto.checksum_for("a token").unwrap();

        assert!(!crypto
            .valid_token(Some("a token"), Some(&checksum[..42]))
            .unwrap());
        assert!(!crypto
            .valid_token(Some("a token"), Some(&format!("{}A", checksum)))
            .unwrap());
    }

    #[test]
    fn test_hot_reloaded_secret_invalidates_checksums() {
        let source = SecretSource::new("old secret");
        let crypto = TokenCrypto::new(source.clone());
        let checksum = crypto.checksum_for("a token").unwrap();

        source.set("new secret");
        assert!(!crypto.valid_token(Some("a token"), Some(&checksum)).unwrap());
    }
}
