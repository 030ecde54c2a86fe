use chrono::{serde::ts_seconds, DateTime, Utc};
use data_encoding::{DecodeError, HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{Deserialize, Serialize};

use crate::ledger::BallotRecord;
use crate::model::common::{CandidateIndex, Identity};

/// A vote the caller wishes to cast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoteSpec {
    pub candidate: CandidateIndex,
}

/// An eligibility proof for self-registration, hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSpec {
    pub proof: String,
}

impl RegistrationSpec {
    pub fn new(proof: &[u8]) -> Self {
        Self {
            proof: HEXLOWER.encode(proof),
        }
    }

    pub fn proof_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        HEXLOWER_PERMISSIVE.decode(self.proof.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotedCandidate {
    pub candidate: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
}

/// A public ballot record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotDescription {
    pub voter: Identity,
    pub candidate: CandidateIndex,
    #[serde(with = "ts_seconds")]
    pub cast_at: DateTime<Utc>,
}

impl From<BallotRecord> for BallotDescription {
    fn from(record: BallotRecord) -> Self {
        Self {
            voter: record.voter,
            candidate: record.candidate,
            cast_at: record.cast_at,
        }
    }
}
