use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::common::{CandidateIndex, ElectionId, Identity};

use super::{
    eligibility::EligibilityRegistry,
    error::{LedgerError, LedgerResult},
    registry::ElectionRegistry,
};

/// Proof that an identity voted in an election, and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotRecord {
    pub voter: Identity,
    pub candidate: CandidateIndex,
    pub cast_at: DateTime<Utc>,
}

/// Ballots of one election, in the order they were cast.
#[derive(Debug, Default, Clone)]
struct ElectionBallots {
    records: Vec<BallotRecord>,
    by_voter: HashMap<Identity, usize>,
}

/// Append-only record of who voted for whom. Owns the only write path to candidate tallies.
#[derive(Debug, Default, Clone)]
pub struct BallotLedger {
    ballots: HashMap<ElectionId, ElectionBallots>,
}

impl BallotLedger {
    /// Record a vote, checking in order: the election exists, it is live, the voter is
    /// eligible, the voter has not voted yet, and the candidate exists.
    ///
    /// The ballot record and the tally increment are written together only after every
    /// check has passed.
    pub fn cast_vote(
        &mut self,
        registry: &mut ElectionRegistry,
        eligibility: &EligibilityRegistry,
        election_id: ElectionId,
        voter: Identity,
        candidate: CandidateIndex,
        now: DateTime<Utc>,
    ) -> LedgerResult<()> {
        let election = registry.get_mut(election_id)?;
        if !election.is_active_at(now) {
            return Err(LedgerError::ElectionNotActive(election_id));
        }
        if !eligibility.is_eligible(election_id, &voter) {
            return Err(LedgerError::NotEligible {
                election: election_id,
                voter,
            });
        }
        if self.has_voted(election_id, &voter) {
            return Err(LedgerError::AlreadyVoted {
                election: election_id,
                voter,
            });
        }
        let count = election.candidates().len();
        let target = election
            .candidate_mut(candidate)
            .ok_or(LedgerError::InvalidCandidate {
                election: election_id,
                index: candidate,
                count,
            })?;

        target.record_vote();
        let ballots = self.ballots.entry(election_id).or_default();
        ballots.by_voter.insert(voter, ballots.records.len());
        ballots.records.push(BallotRecord {
            voter,
            candidate,
            cast_at: now,
        });
        Ok(())
    }

    /// The ballot cast by `voter`, if any.
    pub fn record(&self, election_id: ElectionId, voter: &Identity) -> Option<&BallotRecord> {
        let ballots = self.ballots.get(&election_id)?;
        ballots
            .by_voter
            .get(voter)
            .and_then(|&i| ballots.records.get(i))
    }

    pub fn has_voted(&self, election_id: ElectionId, voter: &Identity) -> bool {
        self.record(election_id, voter).is_some()
    }

    /// Name of the candidate `voter` chose, resolved against the current candidate list.
    pub fn voted_candidate(
        &self,
        registry: &ElectionRegistry,
        election_id: ElectionId,
        voter: &Identity,
    ) -> LedgerResult<String> {
        let election = registry.get(election_id)?;
        let record = self
            .record(election_id, voter)
            .ok_or(LedgerError::HasNotVoted {
                election: election_id,
                voter: *voter,
            })?;
        election
            .candidate(record.candidate)
            .map(|c| c.name().to_string())
            .ok_or(LedgerError::InvalidCandidate {
                election: election_id,
                index: record.candidate,
                count: election.candidates().len(),
            })
    }

    /// All ballots of an election in cast order.
    pub fn ballots(&self, election_id: ElectionId) -> &[BallotRecord] {
        self.ballots
            .get(&election_id)
            .map(|b| b.records.as_slice())
            .unwrap_or(&[])
    }

    /// `(candidate name, votes)` in candidate order.
    pub fn tally(
        &self,
        registry: &ElectionRegistry,
        election_id: ElectionId,
    ) -> LedgerResult<Vec<(String, u64)>> {
        let election = registry.get(election_id)?;
        Ok(election
            .candidates()
            .iter()
            .map(|c| (c.name().to_string(), c.vote_count()))
            .collect())
    }
}
