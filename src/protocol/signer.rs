//! MD5 signatures over message text and a per-device key.
//!
//! The two directions do not agree on the input layout:
//!
//! ```text
//! inbound   md5( text[1 .. first "sig"]  +        key )
//! outbound  md5( json(message)[1 .. -1]  + "," +  key )
//! ```
//!
//! Both are reproduced as observed on real devices.

use md5::{Digest, Md5};
use serde::Serialize;

use super::message::CommandMessage;
use crate::error::DecodeError;

const SIG_MARKER: &str = "\"sig\"";

#[derive(Debug, Clone, Copy, Default)]
pub struct Signer;

impl Signer {
    pub fn new() -> Self {
        Self
    }

    /// Signature for an outbound message, as a 32 character lowercase hex
    /// digest.
    pub fn sign<T: Serialize>(
        &self,
        message: &CommandMessage<T>,
        key: &str,
    ) -> Result<String, serde_json::Error> {
        let plain_text = serde_json::to_string(message)?;
        let inner = plain_text
            .strip_prefix('{')
            .and_then(|text| text.strip_suffix('}'))
            .unwrap_or(&plain_text);
        Ok(self.sign_text(inner, key))
    }

    /// `md5(text + "," + key)`.
    pub fn sign_text(&self, text: &str, key: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(text.as_bytes());
        hasher.update(b",");
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Digest a device is expected to have attached to `raw`.
    pub fn inbound_digest(&self, raw: &str, key: &str) -> Result<String, DecodeError> {
        let end = raw.find(SIG_MARKER).ok_or(DecodeError::MissingSignature)?;
        let plain_text = raw.get(1..end).ok_or(DecodeError::MissingSignature)?;

        let mut hasher = Md5::new();
        hasher.update(plain_text.as_bytes());
        hasher.update(key.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn verify(&self, raw: &str, key: &str, sig: &str) -> Result<bool, DecodeError> {
        Ok(self.inbound_digest(raw, key)? == sig)
    }
}
