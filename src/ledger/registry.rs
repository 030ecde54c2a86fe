use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::common::{CandidateIndex, ElectionId, ElectionState, SybilMethod};

use super::error::{LedgerError, LedgerResult};

/// A single candidate and its running tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    name: String,
    vote_count: u64,
}

impl Candidate {
    fn new(name: String) -> Self {
        Self {
            name,
            vote_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vote_count(&self) -> u64 {
        self.vote_count
    }

    /// Count one more ballot. Only the ballot ledger may call this, alongside
    /// writing the ballot record itself.
    pub(super) fn record_vote(&mut self) {
        self.vote_count += 1;
    }
}

/// An election and its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Election {
    id: ElectionId,
    name: String,
    sybil_method: SybilMethod,
    start_time: DateTime<Utc>,
    duration: Duration,
    state: ElectionState,
    ended_at: Option<DateTime<Utc>>,
    candidates: Vec<Candidate>,
}

impl Election {
    pub fn id(&self) -> ElectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sybil_method(&self) -> SybilMethod {
        self.sybil_method
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Stored lifecycle state. See [`Election::is_active_at`] for the live status.
    pub fn state(&self) -> ElectionState {
        self.state
    }

    /// When an admin explicitly ended the election, if they have.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// End of the active window: votes are admissible strictly before this instant.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, index: CandidateIndex) -> Option<&Candidate> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.candidates.get(i))
    }

    pub(super) fn candidate_mut(&mut self, index: CandidateIndex) -> Option<&mut Candidate> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.candidates.get_mut(i))
    }

    /// Sum of all candidate tallies.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(Candidate::vote_count).sum()
    }

    /// Is voting possible at `now`? Requires the stored state to be active *and* the
    /// window not to have lapsed, so a lapsed election reads as inactive even if
    /// nobody has ended it.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state == ElectionState::Active && now < self.end_time()
    }

    /// Time left in the window at `now`. Never negative, and zero once ended.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        if self.state == ElectionState::Ended {
            return Duration::zero();
        }
        (self.end_time() - now).max(Duration::zero())
    }
}

/// A row of the election listing: `active` is whatever the caller asked for, either
/// the stored flag or the live status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionListing {
    pub id: ElectionId,
    pub name: String,
    pub active: bool,
}

/// Authoritative collection of elections.
#[derive(Debug, Default, Clone)]
pub struct ElectionRegistry {
    elections: BTreeMap<ElectionId, Election>,
    next_id: ElectionId,
}

impl ElectionRegistry {
    /// Create a new election, active immediately. IDs are handed out in order and
    /// never reused.
    pub fn create_election(
        &mut self,
        name: String,
        sybil_method: SybilMethod,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> LedgerResult<ElectionId> {
        if now.checked_add_signed(duration).is_none() {
            return Err(LedgerError::InvalidArgument(
                "election duration is out of range".to_string(),
            ));
        }
        let id = self.next_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| LedgerError::InvalidArgument("election IDs exhausted".to_string()))?;

        self.elections.insert(
            id,
            Election {
                id,
                name,
                sybil_method,
                start_time: now,
                duration,
                state: ElectionState::Active,
                ended_at: None,
                candidates: Vec::new(),
            },
        );
        self.next_id = next_id;
        Ok(id)
    }

    /// Append a candidate. Only possible while the stored state is active.
    pub fn add_candidate(
        &mut self,
        election_id: ElectionId,
        name: String,
    ) -> LedgerResult<CandidateIndex> {
        let election = self.get_mut(election_id)?;
        if election.state != ElectionState::Active {
            return Err(LedgerError::ElectionNotActive(election_id));
        }
        let index = CandidateIndex::try_from(election.candidates.len())
            .map_err(|_| LedgerError::InvalidArgument("too many candidates".to_string()))?;
        election.candidates.push(Candidate::new(name));
        Ok(index)
    }

    /// End an election, regardless of whether its window has lapsed.
    pub fn end_election(&mut self, election_id: ElectionId, now: DateTime<Utc>) -> LedgerResult<()> {
        let election = self.get_mut(election_id)?;
        if election.state == ElectionState::Ended {
            return Err(LedgerError::ElectionAlreadyEnded(election_id));
        }
        election.state = ElectionState::Ended;
        election.ended_at = Some(now);
        Ok(())
    }

    pub fn get(&self, election_id: ElectionId) -> LedgerResult<&Election> {
        self.elections
            .get(&election_id)
            .ok_or(LedgerError::ElectionNotFound(election_id))
    }

    pub(super) fn get_mut(&mut self, election_id: ElectionId) -> LedgerResult<&mut Election> {
        self.elections
            .get_mut(&election_id)
            .ok_or(LedgerError::ElectionNotFound(election_id))
    }

    pub fn is_active(&self, election_id: ElectionId, now: DateTime<Utc>) -> LedgerResult<bool> {
        self.get(election_id).map(|e| e.is_active_at(now))
    }

    pub fn remaining_time(
        &self,
        election_id: ElectionId,
        now: DateTime<Utc>,
    ) -> LedgerResult<Duration> {
        self.get(election_id).map(|e| e.remaining_at(now))
    }

    /// Every election in creation order, flagged by *stored* state.
    pub fn list_all(&self) -> Vec<ElectionListing> {
        self.elections
            .values()
            .map(|e| ElectionListing {
                id: e.id,
                name: e.name.clone(),
                active: e.state == ElectionState::Active,
            })
            .collect()
    }

    /// Elections accepting votes at `now`, in creation order.
    pub fn list_active(&self, now: DateTime<Utc>) -> Vec<ElectionListing> {
        self.elections
            .values()
            .filter(|e| e.is_active_at(now))
            .map(|e| ElectionListing {
                id: e.id,
                name: e.name.clone(),
                active: true,
            })
            .collect()
    }

    /// The most recently created election.
    pub fn current(&self) -> LedgerResult<ElectionId> {
        self.elections
            .keys()
            .next_back()
            .copied()
            .ok_or(LedgerError::NoElections)
    }
}
