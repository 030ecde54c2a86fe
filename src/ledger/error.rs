use thiserror::Error;

use crate::model::common::{CandidateIndex, ElectionId, Identity};

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Every way a ledger operation can be refused.
///
/// None of these are transient: retrying the same call against the same state
/// gives the same answer. A call that returns one of these has changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("caller does not hold the admin capability")]
    Unauthorized,
    #[error("election {0} does not exist")]
    ElectionNotFound(ElectionId),
    #[error("election {0} is not active")]
    ElectionNotActive(ElectionId),
    #[error("election {0} has already ended")]
    ElectionAlreadyEnded(ElectionId),
    #[error("{voter} is not eligible to vote in election {election}")]
    NotEligible {
        election: ElectionId,
        voter: Identity,
    },
    #[error("{voter} has already voted in election {election}")]
    AlreadyVoted {
        election: ElectionId,
        voter: Identity,
    },
    #[error("election {election} has no candidate {index} ({count} candidates)")]
    InvalidCandidate {
        election: ElectionId,
        index: CandidateIndex,
        count: usize,
    },
    #[error("{voter} has not voted in election {election}")]
    HasNotVoted {
        election: ElectionId,
        voter: Identity,
    },
    #[error("no elections have been created")]
    NoElections,
    #[error("cannot revoke the last admin")]
    LastAdmin,
    #[error("eligibility proof from {voter} for election {election} was rejected")]
    ProofRejected {
        election: ElectionId,
        voter: Identity,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl LedgerError {
    /// Stable name of the error kind, suitable for clients to match on.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::ElectionNotFound(_) => "ElectionNotFound",
            Self::ElectionNotActive(_) => "ElectionNotActive",
            Self::ElectionAlreadyEnded(_) => "ElectionAlreadyEnded",
            Self::NotEligible { .. } => "NotEligible",
            Self::AlreadyVoted { .. } => "AlreadyVoted",
            Self::InvalidCandidate { .. } => "InvalidCandidate",
            Self::HasNotVoted { .. } => "HasNotVoted",
            Self::NoElections => "NoElections",
            Self::LastAdmin => "LastAdmin",
            Self::ProofRejected { .. } => "ProofRejected",
            Self::InvalidArgument(_) => "InvalidArgument",
        }
    }
}
