use data_encoding::{DecodeError, HEXLOWER, HEXLOWER_PERMISSIVE};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::common::Identity;

/// A login challenge as sent to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    /// Hex-encoded nonce to sign.
    pub nonce: String,
}

impl ChallengeResponse {
    pub fn new(nonce: &[u8]) -> Self {
        Self {
            nonce: HEXLOWER.encode(nonce),
        }
    }

    pub fn nonce_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        HEXLOWER_PERMISSIVE.decode(self.nonce.as_bytes())
    }
}

/// A signed login challenge: proof that the client holds the key behind an identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Hex-encoded Ed25519 verifying key.
    pub public_key: String,
    /// Hex-encoded Ed25519 signature over the raw nonce bytes.
    pub signature: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("`public_key` is not a valid Ed25519 key")]
    MalformedKey,
    #[error("`signature` is not a valid Ed25519 signature encoding")]
    MalformedSignature,
    #[error("signature does not match the challenge")]
    BadSignature,
}

impl LoginRequest {
    /// Sign `nonce` with `key`.
    pub fn sign(key: &SigningKey, nonce: &[u8]) -> Self {
        Self {
            public_key: HEXLOWER.encode(key.verifying_key().as_bytes()),
            signature: HEXLOWER.encode(&key.sign(nonce).to_bytes()),
        }
    }

    /// Check the signature over `nonce` and return the identity it proves.
    pub fn verify(&self, nonce: &[u8]) -> Result<Identity, LoginError> {
        let key_bytes: [u8; 32] = HEXLOWER_PERMISSIVE
            .decode(self.public_key.as_bytes())
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(LoginError::MalformedKey)?;
        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| LoginError::MalformedKey)?;

        let signature = HEXLOWER_PERMISSIVE
            .decode(self.signature.as_bytes())
            .ok()
            .and_then(|bytes| Signature::from_slice(&bytes).ok())
            .ok_or(LoginError::MalformedSignature)?;

        key.verify_strict(nonce, &signature)
            .map_err(|_| LoginError::BadSignature)?;
        Ok(Identity::from_verifying_key(&key))
    }
}
