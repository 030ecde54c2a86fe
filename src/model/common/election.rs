use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Our election IDs are integers, assigned from zero and never reused.
pub type ElectionId = u32;
/// Candidates are referenced by their position in the election's candidate list.
pub type CandidateIndex = u32;

/// States in the Election lifecycle.
///
/// Only the stored intent is kept here. Whether voting is currently possible also
/// depends on the election's time window, see `Election::is_active_at`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionState {
    /// Created and not explicitly ended.
    Active,
    /// Explicitly ended by an admin. Terminal.
    Ended,
}

/// Sybil-resistance method governing how eligibility is established, fixed at creation.
/// Serialised as its numeric tag.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum SybilMethod {
    /// Admins allow-list voters directly.
    #[default]
    None = 0,
    /// Voters prove anonymous group membership.
    Semaphore = 1,
    /// Voters present an identity-verification attestation.
    Kyc = 2,
}

impl Display for SybilMethod {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::None => "none",
                Self::Semaphore => "semaphore",
                Self::Kyc => "kyc",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    #[test]
    fn sybil_method_uses_numeric_tag() {
        assert_eq!(serde_json::to_string(&SybilMethod::None).unwrap(), "0");
        assert_eq!(serde_json::to_string(&SybilMethod::Kyc).unwrap(), "2");
        assert_eq!(
            serde_json::from_str::<SybilMethod>("1").unwrap(),
            SybilMethod::Semaphore
        );
        assert!(serde_json::from_str::<SybilMethod>("3").is_err());
    }
}
