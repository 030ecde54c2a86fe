use serde::{Deserialize, Serialize};

use crate::model::common::Identity;

/// An identity named in a request body, e.g. a new admin or an eligible voter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdentitySpec {
    pub identity: Identity,
}

/// Whether an identity holds the admin capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStatus {
    pub identity: Identity,
    pub admin: bool,
}
