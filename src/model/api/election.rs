use chrono::{
    serde::{ts_seconds, ts_seconds_option},
    DateTime, Duration, Utc,
};
use serde::{Deserialize, Serialize};

use crate::ledger::{ElectionListing, ElectionReport};
use crate::model::common::{CandidateIndex, ElectionId, ElectionState, SybilMethod};

/// An election to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub name: String,
    #[serde(default)]
    pub sybil_method: SybilMethod,
    /// Length of the voting window; the configured default if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    /// Candidates to add as part of creation.
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl ElectionSpec {
    pub fn duration(&self, default: Duration) -> Duration {
        self.duration_secs
            .map(|secs| Duration::seconds(secs.into()))
            .unwrap_or(default)
    }
}

/// A candidate to add to an existing election.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAdded {
    pub election: ElectionId,
    pub index: CandidateIndex,
}

/// One line of an election listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub id: ElectionId,
    pub name: String,
    /// Stored flag for full listings, live status for active listings.
    pub active: bool,
}

impl From<ElectionListing> for ElectionSummary {
    fn from(listing: ElectionListing) -> Self {
        Self {
            id: listing.id,
            name: listing.name,
            active: listing.active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentElection {
    pub id: ElectionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub index: CandidateIndex,
    pub name: String,
    pub votes: u64,
}

/// Full description of an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    pub id: ElectionId,
    pub name: String,
    pub sybil_method: SybilMethod,
    /// Stored state.
    pub state: ElectionState,
    /// Live status: stored state is active and the window has not lapsed.
    pub active: bool,
    #[serde(with = "ts_seconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    pub end_time: DateTime<Utc>,
    #[serde(with = "ts_seconds_option")]
    pub ended_at: Option<DateTime<Utc>>,
    pub remaining_secs: i64,
    pub candidates: Vec<CandidateTally>,
}

impl From<&ElectionReport> for ElectionDescription {
    fn from(report: &ElectionReport) -> Self {
        let election = &report.election;
        Self {
            id: election.id(),
            name: election.name().to_string(),
            sybil_method: election.sybil_method(),
            state: election.state(),
            active: report.active,
            start_time: election.start_time(),
            end_time: election.end_time(),
            ended_at: election.ended_at(),
            remaining_secs: report.remaining.num_seconds(),
            candidates: tallies(report),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingStatus {
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub remaining_secs: i64,
}

impl From<Duration> for RemainingTime {
    fn from(remaining: Duration) -> Self {
        Self {
            remaining_secs: remaining.num_seconds(),
        }
    }
}

/// Results page: the tally alongside turnout and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub id: ElectionId,
    pub name: String,
    pub active: bool,
    pub remaining_secs: i64,
    pub eligible_voters: usize,
    pub total_votes: u64,
    pub tally: Vec<CandidateTally>,
}

impl From<&ElectionReport> for ElectionResults {
    fn from(report: &ElectionReport) -> Self {
        Self {
            id: report.election.id(),
            name: report.election.name().to_string(),
            active: report.active,
            remaining_secs: report.remaining.num_seconds(),
            eligible_voters: report.eligible_voters,
            total_votes: report.election.total_votes(),
            tally: tallies(report),
        }
    }
}

fn tallies(report: &ElectionReport) -> Vec<CandidateTally> {
    report
        .election
        .candidates()
        .iter()
        .zip(0..)
        .map(|(candidate, index)| CandidateTally {
            index,
            name: candidate.name().to_string(),
            votes: candidate.vote_count(),
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_defaults() {
        let spec: ElectionSpec =
            rocket::serde::json::serde_json::from_str(r#"{"name": "Quick"}"#).unwrap();
        assert_eq!(spec.sybil_method, SybilMethod::None);
        assert!(spec.candidates.is_empty());
        assert_eq!(
            spec.duration(Duration::seconds(42)),
            Duration::seconds(42)
        );
        assert_eq!(
            ElectionSpec::example().duration(Duration::seconds(42)),
            Duration::seconds(600)
        );
    }
}
