use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ed25519_dalek::VerifyingKey;
use rocket::request::FromParam;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of bytes in an identity.
pub const IDENTITY_LEN: usize = 20;

/// An opaque actor handle, used as the key for admin rights, eligibility and ballots.
///
/// Identities are derived from Ed25519 verifying keys, so holding one requires holding
/// the corresponding signing key. They are rendered as `0x`-prefixed lowercase hex.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// Wrap raw identity bytes.
    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the identity owned by the given verifying key: the leading bytes of
    /// the SHA-256 digest of the key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let mut bytes = [0; IDENTITY_LEN];
        bytes.copy_from_slice(&digest[..IDENTITY_LEN]);
        Self(bytes)
    }

    /// The raw identity bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", HEXLOWER.encode(&self.0))
    }
}

impl Debug for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({self})")
    }
}

/// Reasons an identity string can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity must start with `0x`")]
    MissingPrefix,
    #[error("identity is not valid hex")]
    BadHex,
    #[error("identity must be {IDENTITY_LEN} bytes, got {0}")]
    BadLength(usize),
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").ok_or(IdentityError::MissingPrefix)?;
        let bytes = HEXLOWER_PERMISSIVE
            .decode(hex.as_bytes())
            .map_err(|_| IdentityError::BadHex)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| IdentityError::BadLength(len))
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl<'a> FromParam<'a> for Identity {
    type Error = IdentityError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Identity {
        pub fn example_admin() -> Self {
            Self([0xad; IDENTITY_LEN])
        }

        pub fn example_voter1() -> Self {
            Self([0x01; IDENTITY_LEN])
        }

        pub fn example_voter2() -> Self {
            Self([0x02; IDENTITY_LEN])
        }

        pub fn example_outsider() -> Self {
            Self([0xee; IDENTITY_LEN])
        }
    }
}
