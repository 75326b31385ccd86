//! Per-render masking of the authenticity token.
//!
//! Rendered pages never embed the raw token. Each render XORs it with a
//! fresh one-time pad and publishes `base64(pad ‖ pad ⊕ token)`, so the
//! page content changes on every response while still unmasking to the
//! same token.

use crate::config::AUTHENTICITY_TOKEN_LENGTH;
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};

/// Mask a token with a fresh one-time pad
pub fn mask_token(token: &str) -> String {
    let raw = token.as_bytes();
    let mut pad = vec![0u8; raw.len()];
    OsRng.fill_bytes(&mut pad);

    let mut masked = pad.clone();
    masked.extend(xor(&pad, raw));
    STANDARD.encode(masked)
}

/// Recover the raw token bytes from a submitted value
///
/// A value decoding to [`AUTHENTICITY_TOKEN_LENGTH`] bytes is an unmasked
/// token and is returned as is; one decoding to twice that length is
/// unmasked. Anything else yields `None`.
pub fn unmask_token(encoded: &str) -> Option<Vec<u8>> {
    let decoded = STANDARD.decode(encoded).ok()?;

    if decoded.len() == AUTHENTICITY_TOKEN_LENGTH {
        Some(decoded)
    } else if decoded.len() == AUTHENTICITY_TOKEN_LENGTH * 2 {
        let (pad, encrypted) = decoded.split_at(AUTHENTICITY_TOKEN_LENGTH);
        Some(xor(pad, encrypted))
    } else {
        None
    }
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}
