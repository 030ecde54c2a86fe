mod election;
mod identity;

pub use election::{CandidateIndex, ElectionId, ElectionState, SybilMethod};
pub use identity::{Identity, IdentityError, IDENTITY_LEN};
