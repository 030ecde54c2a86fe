//! Signature-based login: a random challenge is signed with an Ed25519 key, and the
//! resulting identity is carried in a JWT cookie.

mod challenge;
mod token;

pub use challenge::{Challenge, CHALLENGE_COOKIE, NONCE_LEN};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
