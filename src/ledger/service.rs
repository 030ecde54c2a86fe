use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Duration;
use log::{info, warn};

use crate::model::common::{CandidateIndex, ElectionId, Identity, SybilMethod};

use super::{
    access::AccessControl,
    ballot::{BallotLedger, BallotRecord},
    clock::Clock,
    eligibility::EligibilityRegistry,
    error::{LedgerError, LedgerResult},
    gating::GatingPolicy,
    registry::{Election, ElectionListing, ElectionRegistry},
};

/// Everything the ledger knows, guarded as one unit.
struct LedgerState {
    access: AccessControl,
    registry: ElectionRegistry,
    eligibility: EligibilityRegistry,
    ballots: BallotLedger,
}

/// A consistent snapshot of an election and its outcome so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionReport {
    pub election: Election,
    /// Live status, as used for vote admission.
    pub active: bool,
    pub remaining: Duration,
    pub eligible_voters: usize,
    pub ballots_cast: usize,
}

/// The public surface of the ledger.
///
/// All mutations hold the write lock for their whole duration, so they are totally
/// ordered and each one either fully applies or leaves no trace. Reads share the read
/// lock and always see a state between two mutations.
pub struct ElectionService {
    state: RwLock<LedgerState>,
    clock: Arc<dyn Clock>,
    gating: GatingPolicy,
}

impl ElectionService {
    /// Create an empty ledger with a single bootstrap admin and no gating verifiers.
    pub fn new(admin: Identity, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                access: AccessControl::new(admin),
                registry: ElectionRegistry::default(),
                eligibility: EligibilityRegistry::default(),
                ballots: BallotLedger::default(),
            }),
            clock,
            gating: GatingPolicy::default(),
        }
    }

    /// Create a ledger with a bootstrap admin and the given registration verifiers.
    pub fn bootstrap(admin: Identity, clock: Arc<dyn Clock>, gating: GatingPolicy) -> Self {
        info!("Bootstrapping ledger with admin {admin}");
        Self::new(admin, clock).with_gating(gating)
    }

    /// Replace the gating policy used for voter self-registration.
    pub fn with_gating(mut self, gating: GatingPolicy) -> Self {
        self.gating = gating;
        self
    }

    // No mutation can panic between its first and last write, so a poisoned lock
    // still guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Access control ----

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.read().access.is_admin(identity)
    }

    pub fn admins(&self) -> Vec<Identity> {
        self.read().access.admins().copied().collect()
    }

    pub fn grant_admin(&self, caller: &Identity, identity: Identity) -> LedgerResult<()> {
        let mut state = self.write();
        let granted = state
            .access
            .grant_admin(caller, identity)
            .map_err(|e| denied(caller, "grant admin", e))?;
        if granted {
            info!("{caller} granted admin to {identity}");
        }
        Ok(())
    }

    pub fn revoke_admin(&self, caller: &Identity, identity: &Identity) -> LedgerResult<()> {
        let mut state = self.write();
        let revoked = state
            .access
            .revoke_admin(caller, identity)
            .map_err(|e| denied(caller, "revoke admin", e))?;
        if revoked {
            info!("{caller} revoked admin from {identity}");
        }
        Ok(())
    }

    // ---- Elections ----

    /// Create an election, active from now for `duration`.
    pub fn create_election(
        &self,
        caller: &Identity,
        name: &str,
        sybil_method: SybilMethod,
        duration: Duration,
    ) -> LedgerResult<ElectionId> {
        self.create_election_with_candidates(caller, name, sybil_method, duration, &[] as &[&str])
    }

    /// Create an election and its initial candidates as one atomic step.
    pub fn create_election_with_candidates<S: AsRef<str>>(
        &self,
        caller: &Identity,
        name: &str,
        sybil_method: SybilMethod,
        duration: Duration,
        candidates: &[S],
    ) -> LedgerResult<ElectionId> {
        let mut state = self.write();
        state
            .access
            .ensure_admin(caller)
            .map_err(|e| denied(caller, "create an election", e))?;
        let name = validate_name(name, "election")?;
        if duration <= Duration::zero() {
            return Err(LedgerError::InvalidArgument(
                "election duration must be positive".to_string(),
            ));
        }
        let candidates = candidates
            .iter()
            .map(|c| validate_name(c.as_ref(), "candidate"))
            .collect::<LedgerResult<Vec<_>>>()?;

        // Build on a copy so a failure part-way leaves nothing behind.
        let mut registry = state.registry.clone();
        let now = self.clock.now();
        let id = registry.create_election(name, sybil_method, duration, now)?;
        for candidate in candidates {
            registry.add_candidate(id, candidate)?;
        }
        state.registry = registry;

        let election = state.registry.get(id)?;
        info!(
            "{caller} created election {id} \"{}\" ({sybil_method}, {}s, {} candidates)",
            election.name(),
            duration.num_seconds(),
            election.candidates().len()
        );
        Ok(id)
    }

    pub fn add_candidate(
        &self,
        caller: &Identity,
        election_id: ElectionId,
        name: &str,
    ) -> LedgerResult<CandidateIndex> {
        let mut state = self.write();
        state
            .access
            .ensure_admin(caller)
            .map_err(|e| denied(caller, "add a candidate", e))?;
        let name = validate_name(name, "candidate")?;
        let index = state.registry.add_candidate(election_id, name)?;
        info!("{caller} added candidate {index} to election {election_id}");
        Ok(index)
    }

    /// Add a candidate to the most recently created election.
    pub fn add_candidate_to_current(
        &self,
        caller: &Identity,
        name: &str,
    ) -> LedgerResult<(ElectionId, CandidateIndex)> {
        let mut state = self.write();
        state
            .access
            .ensure_admin(caller)
            .map_err(|e| denied(caller, "add a candidate", e))?;
        let name = validate_name(name, "candidate")?;
        let election_id = state.registry.current()?;
        let index = state.registry.add_candidate(election_id, name)?;
        info!("{caller} added candidate {index} to current election {election_id}");
        Ok((election_id, index))
    }

    pub fn end_election(&self, caller: &Identity, election_id: ElectionId) -> LedgerResult<()> {
        let mut state = self.write();
        state
            .access
            .ensure_admin(caller)
            .map_err(|e| denied(caller, "end an election", e))?;
        let now = self.clock.now();
        state.registry.end_election(election_id, now)?;
        info!("{caller} ended election {election_id}");
        Ok(())
    }

    /// End the most recently created election.
    pub fn end_current_election(&self, caller: &Identity) -> LedgerResult<ElectionId> {
        let mut state = self.write();
        state
            .access
            .ensure_admin(caller)
            .map_err(|e| denied(caller, "end an election", e))?;
        let election_id = state.registry.current()?;
        let now = self.clock.now();
        state.registry.end_election(election_id, now)?;
        info!("{caller} ended current election {election_id}");
        Ok(election_id)
    }

    /// Snapshot of a single election.
    pub fn election(&self, election_id: ElectionId) -> LedgerResult<Election> {
        self.read().registry.get(election_id).cloned()
    }

    pub fn current_election(&self) -> LedgerResult<ElectionId> {
        self.read().registry.current()
    }

    /// Every election with its *stored* active flag. This can disagree with
    /// [`ElectionService::voting_status`] once an election's window has lapsed but
    /// nobody has ended it yet.
    pub fn list_all(&self) -> Vec<ElectionListing> {
        self.read().registry.list_all()
    }

    /// Elections currently accepting votes.
    pub fn list_active(&self) -> Vec<ElectionListing> {
        let now = self.clock.now();
        self.read().registry.list_active(now)
    }

    /// Is the election accepting votes right now?
    pub fn voting_status(&self, election_id: ElectionId) -> LedgerResult<bool> {
        let now = self.clock.now();
        self.read().registry.is_active(election_id, now)
    }

    pub fn remaining_time(&self, election_id: ElectionId) -> LedgerResult<Duration> {
        let now = self.clock.now();
        self.read().registry.remaining_time(election_id, now)
    }

    // ---- Eligibility ----

    pub fn add_eligible_voter(
        &self,
        caller: &Identity,
        election_id: ElectionId,
        voter: Identity,
    ) -> LedgerResult<()> {
        let mut state = self.write();
        state
            .access
            .ensure_admin(caller)
            .map_err(|e| denied(caller, "add an eligible voter", e))?;
        state.registry.get(election_id)?;
        if state.eligibility.add(election_id, voter) {
            info!("{caller} made {voter} eligible in election {election_id}");
        }
        Ok(())
    }

    /// Let `voter` make itself eligible by presenting a proof accepted by the verifier
    /// for the election's Sybil-resistance method.
    pub fn register_voter(
        &self,
        election_id: ElectionId,
        voter: Identity,
        proof: &[u8],
    ) -> LedgerResult<()> {
        let mut state = self.write();
        let now = self.clock.now();
        let election = state.registry.get(election_id)?;
        if !election.is_active_at(now) {
            return Err(LedgerError::ElectionNotActive(election_id));
        }
        let method = election.sybil_method();
        let verifier = self
            .gating
            .verifier_for(method)
            .ok_or(LedgerError::Unauthorized)?;
        if !verifier.verify(election_id, &voter, proof) {
            warn!("Rejected {method} proof from {voter} for election {election_id}");
            return Err(LedgerError::ProofRejected {
                election: election_id,
                voter,
            });
        }
        if state.eligibility.add(election_id, voter) {
            info!("{voter} registered for election {election_id} via {method}");
        }
        Ok(())
    }

    pub fn is_eligible(&self, election_id: ElectionId, voter: &Identity) -> LedgerResult<bool> {
        let state = self.read();
        state.registry.get(election_id)?;
        Ok(state.eligibility.is_eligible(election_id, voter))
    }

    // ---- Ballots ----

    pub fn cast_vote(
        &self,
        election_id: ElectionId,
        voter: Identity,
        candidate: CandidateIndex,
    ) -> LedgerResult<()> {
        let mut state = self.write();
        let now = self.clock.now();
        let LedgerState {
            registry,
            eligibility,
            ballots,
            ..
        } = &mut *state;
        ballots.cast_vote(registry, eligibility, election_id, voter, candidate, now)?;
        info!("{voter} voted in election {election_id}");
        Ok(())
    }

    pub fn voted_candidate(&self, election_id: ElectionId, voter: &Identity) -> LedgerResult<String> {
        let state = self.read();
        state
            .ballots
            .voted_candidate(&state.registry, election_id, voter)
    }

    pub fn has_voted(&self, election_id: ElectionId, voter: &Identity) -> LedgerResult<bool> {
        let state = self.read();
        state.registry.get(election_id)?;
        Ok(state.ballots.has_voted(election_id, voter))
    }

    /// `(candidate name, votes)` in candidate order.
    pub fn tally(&self, election_id: ElectionId) -> LedgerResult<Vec<(String, u64)>> {
        let state = self.read();
        state.ballots.tally(&state.registry, election_id)
    }

    /// One page of an election's ballots in cast order, plus the total number of ballots.
    pub fn ballots_page(
        &self,
        election_id: ElectionId,
        skip: usize,
        limit: usize,
    ) -> LedgerResult<(usize, Vec<BallotRecord>)> {
        let state = self.read();
        state.registry.get(election_id)?;
        let ballots = state.ballots.ballots(election_id);
        let page = ballots.iter().skip(skip).take(limit).cloned().collect();
        Ok((ballots.len(), page))
    }

    /// Election, tallies, turnout and status read under one lock.
    pub fn report(&self, election_id: ElectionId) -> LedgerResult<ElectionReport> {
        let state = self.read();
        let now = self.clock.now();
        let election = state.registry.get(election_id)?;
        Ok(ElectionReport {
            election: election.clone(),
            active: election.is_active_at(now),
            remaining: election.remaining_at(now),
            eligible_voters: state.eligibility.eligible_count(election_id),
            ballots_cast: state.ballots.ballots(election_id).len(),
        })
    }
}

/// Trim a display name and reject it if nothing is left.
fn validate_name(name: &str, what: &str) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(LedgerError::InvalidArgument(format!(
            "{what} name must not be empty"
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Log refused admin operations.
fn denied(caller: &Identity, action: &str, error: LedgerError) -> LedgerError {
    warn!("{caller} may not {action}: {error}");
    error
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::ledger::{KycAttestation, MockClock};
    use crate::model::common::ElectionState;

    use super::*;

    fn service() -> (ElectionService, MockClock) {
        let clock = MockClock::new(Utc::now());
        let service = ElectionService::new(Identity::example_admin(), Arc::new(clock.clone()));
        (service, clock)
    }

    /// Create "Board Vote" with Alice, Bob and Charlie for 600 seconds.
    fn board_vote(service: &ElectionService) -> ElectionId {
        let admin = Identity::example_admin();
        let id = service
            .create_election(&admin, "Board Vote", SybilMethod::None, Duration::seconds(600))
            .unwrap();
        for name in ["Alice", "Bob", "Charlie"] {
            service.add_candidate(&admin, id, name).unwrap();
        }
        id
    }

    fn tally_of(counts: [u64; 3]) -> Vec<(String, u64)> {
        ["Alice", "Bob", "Charlie"]
            .into_iter()
            .map(String::from)
            .zip(counts)
            .collect()
    }

    #[test]
    fn board_vote_scenario() {
        let (service, _) = service();
        let admin = Identity::example_admin();
        let x = Identity::example_voter1();
        let y = Identity::example_voter2();
        let e = board_vote(&service);

        service.add_eligible_voter(&admin, e, x).unwrap();
        service.cast_vote(e, x, 1).unwrap();
        assert_eq!(service.tally(e).unwrap(), tally_of([0, 1, 0]));
        assert_eq!(service.voted_candidate(e, &x).unwrap(), "Bob");

        // Y was never made eligible.
        assert_eq!(
            service.cast_vote(e, y, 0),
            Err(LedgerError::NotEligible {
                election: e,
                voter: y
            })
        );
        assert_eq!(service.tally(e).unwrap(), tally_of([0, 1, 0]));
        assert_eq!(
            service.voted_candidate(e, &y),
            Err(LedgerError::HasNotVoted {
                election: e,
                voter: y
            })
        );

        // X cannot vote again, for anyone.
        for candidate in 0..4 {
            assert_eq!(
                service.cast_vote(e, x, candidate),
                Err(LedgerError::AlreadyVoted {
                    election: e,
                    voter: x
                })
            );
        }
        assert_eq!(service.tally(e).unwrap(), tally_of([0, 1, 0]));
    }

    #[test]
    fn non_admin_is_refused_without_side_effects() {
        let (service, _) = service();
        let outsider = Identity::example_outsider();
        let e = board_vote(&service);
        let before = service.election(e).unwrap();

        assert_eq!(
            service.add_candidate(&outsider, e, "Mallory"),
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(
            service.add_candidate_to_current(&outsider, "Mallory"),
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(
            service.create_election(&outsider, "Coup", SybilMethod::None, Duration::seconds(1)),
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(
            service.end_election(&outsider, e),
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(
            service.add_eligible_voter(&outsider, e, outsider),
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(
            service.grant_admin(&outsider, outsider),
            Err(LedgerError::Unauthorized)
        );

        assert_eq!(service.election(e).unwrap(), before);
        assert_eq!(service.list_all().len(), 1);
        assert_eq!(service.is_eligible(e, &outsider), Ok(false));
        assert!(!service.is_admin(&outsider));
    }

    #[test]
    fn parameters_are_validated() {
        let (service, _) = service();
        let admin = Identity::example_admin();

        assert!(matches!(
            service.create_election(&admin, "   ", SybilMethod::None, Duration::seconds(60)),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.create_election(&admin, "Zero", SybilMethod::None, Duration::zero()),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.create_election_with_candidates(
                &admin,
                "Partial",
                SybilMethod::None,
                Duration::seconds(60),
                &["Alice", ""]
            ),
            Err(LedgerError::InvalidArgument(_))
        ));
        // None of the failures consumed an ID.
        assert_eq!(service.current_election(), Err(LedgerError::NoElections));

        let e = service
            .create_election(&admin, "  Trimmed  ", SybilMethod::None, Duration::seconds(60))
            .unwrap();
        assert_eq!(e, 0);
        assert_eq!(service.election(e).unwrap().name(), "Trimmed");
        assert!(matches!(
            service.add_candidate(&admin, e, "\t"),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(service.election(e).unwrap().candidates().is_empty());
    }

    #[test]
    fn unrepresentable_window_is_rejected() {
        let (service, _) = service();
        let admin = Identity::example_admin();

        assert!(matches!(
            service.create_election(
                &admin,
                "Forever",
                SybilMethod::None,
                Duration::days(365 * 300_000)
            ),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert_eq!(service.current_election(), Err(LedgerError::NoElections));

        // Queries over the remaining elections keep working.
        let e = board_vote(&service);
        assert_eq!(e, 0);
        assert_eq!(service.voting_status(e), Ok(true));
        assert_eq!(service.list_active().len(), 1);
        assert!(service.report(e).is_ok());
    }

    #[test]
    fn create_with_candidates() {
        let (service, _) = service();
        let admin = Identity::example_admin();
        let e = service
            .create_election_with_candidates(
                &admin,
                "Board Vote",
                SybilMethod::None,
                Duration::seconds(600),
                &["Alice", "Bob", "Charlie"],
            )
            .unwrap();
        assert_eq!(service.tally(e).unwrap(), tally_of([0, 0, 0]));
    }

    #[test]
    fn lapsed_window_scenario() {
        let (service, clock) = service();
        let admin = Identity::example_admin();
        let x = Identity::example_voter1();
        let e = board_vote(&service);
        service.add_eligible_voter(&admin, e, x).unwrap();

        clock.advance(Duration::seconds(599));
        assert_eq!(service.voting_status(e), Ok(true));
        assert_eq!(service.remaining_time(e), Ok(Duration::seconds(1)));

        clock.advance(Duration::seconds(1));
        assert_eq!(service.voting_status(e), Ok(false));
        assert_eq!(service.remaining_time(e), Ok(Duration::zero()));
        assert_eq!(
            service.cast_vote(e, x, 0),
            Err(LedgerError::ElectionNotActive(e))
        );
        assert!(service.list_active().is_empty());

        // Stored flag is untouched until an admin ends the election.
        let all = service.list_all();
        assert!(all[0].active);
        assert_eq!(service.election(e).unwrap().state(), ElectionState::Active);

        service.end_election(&admin, e).unwrap();
        assert!(!service.list_all()[0].active);
    }

    #[test]
    fn ending_twice_is_refused() {
        let (service, clock) = service();
        let admin = Identity::example_admin();
        let e = board_vote(&service);

        service.end_election(&admin, e).unwrap();
        let ended = service.election(e).unwrap();
        assert_eq!(ended.ended_at(), Some(clock.now()));

        clock.advance(Duration::seconds(10));
        assert_eq!(
            service.end_election(&admin, e),
            Err(LedgerError::ElectionAlreadyEnded(e))
        );
        assert_eq!(service.election(e).unwrap(), ended);
        assert_eq!(
            service.add_candidate(&admin, e, "Late"),
            Err(LedgerError::ElectionNotActive(e))
        );
    }

    #[test]
    fn current_election_operations() {
        let (service, _) = service();
        let admin = Identity::example_admin();

        assert_eq!(
            service.add_candidate_to_current(&admin, "Alice"),
            Err(LedgerError::NoElections)
        );
        assert_eq!(
            service.end_current_election(&admin),
            Err(LedgerError::NoElections)
        );

        let first = board_vote(&service);
        let second = service
            .create_election(&admin, "Second", SybilMethod::None, Duration::seconds(60))
            .unwrap();
        assert_eq!(service.current_election(), Ok(second));

        assert_eq!(
            service.add_candidate_to_current(&admin, "Dana"),
            Ok((second, 0))
        );
        assert_eq!(service.end_current_election(&admin), Ok(second));
        assert_eq!(service.voting_status(first), Ok(true));
        assert_eq!(service.voting_status(second), Ok(false));
    }

    #[test]
    fn eligibility_requires_known_election() {
        let (service, _) = service();
        let admin = Identity::example_admin();
        assert_eq!(
            service.add_eligible_voter(&admin, 7, Identity::example_voter1()),
            Err(LedgerError::ElectionNotFound(7))
        );
        assert_eq!(
            service.is_eligible(7, &Identity::example_voter1()),
            Err(LedgerError::ElectionNotFound(7))
        );
    }

    #[test]
    fn kyc_self_registration() {
        let clock = MockClock::new(Utc::now());
        let kyc = KycAttestation::new("provider secret");
        let service = ElectionService::new(Identity::example_admin(), Arc::new(clock.clone()))
            .with_gating(GatingPolicy::default().with_kyc(kyc.clone()));
        let admin = Identity::example_admin();
        let voter = Identity::example_voter1();

        let e = service
            .create_election_with_candidates(
                &admin,
                "Verified",
                SybilMethod::Kyc,
                Duration::seconds(60),
                &["Yes", "No"],
            )
            .unwrap();

        let forged = KycAttestation::new("wrong").attest(e, &voter);
        assert_eq!(
            service.register_voter(e, voter, &forged),
            Err(LedgerError::ProofRejected { election: e, voter })
        );
        assert_eq!(service.is_eligible(e, &voter), Ok(false));

        let proof = kyc.attest(e, &voter);
        service.register_voter(e, voter, &proof).unwrap();
        service.register_voter(e, voter, &proof).unwrap();
        assert_eq!(service.is_eligible(e, &voter), Ok(true));
        assert_eq!(service.report(e).unwrap().eligible_voters, 1);

        service.cast_vote(e, voter, 0).unwrap();
        assert_eq!(service.voted_candidate(e, &voter).unwrap(), "Yes");

        clock.advance(Duration::seconds(60));
        let late = Identity::example_voter2();
        assert_eq!(
            service.register_voter(e, late, &kyc.attest(e, &late)),
            Err(LedgerError::ElectionNotActive(e))
        );
    }

    #[test]
    fn ungated_and_unconfigured_registration() {
        let (service, _) = service();
        let admin = Identity::example_admin();
        let voter = Identity::example_voter1();

        let open = board_vote(&service);
        assert_eq!(
            service.register_voter(open, voter, b"please"),
            Err(LedgerError::Unauthorized)
        );

        let semaphore = service
            .create_election(&admin, "Anonymous", SybilMethod::Semaphore, Duration::seconds(60))
            .unwrap();
        assert_eq!(
            service.register_voter(semaphore, voter, b"proof"),
            Err(LedgerError::ProofRejected {
                election: semaphore,
                voter
            })
        );
        assert_eq!(
            service.register_voter(99, voter, b"proof"),
            Err(LedgerError::ElectionNotFound(99))
        );
    }

    #[test]
    fn admin_management() {
        let (service, _) = service();
        let admin = Identity::example_admin();
        let deputy = Identity::example_voter1();

        service.grant_admin(&admin, deputy).unwrap();
        assert!(service.is_admin(&deputy));
        assert_eq!(service.admins().len(), 2);

        // The deputy can now run elections.
        let e = service
            .create_election(&deputy, "Deputy's", SybilMethod::None, Duration::seconds(60))
            .unwrap();
        service.add_candidate(&deputy, e, "Alice").unwrap();

        service.revoke_admin(&deputy, &admin).unwrap();
        assert_eq!(service.admins(), vec![deputy]);
        assert_eq!(
            service.revoke_admin(&deputy, &deputy),
            Err(LedgerError::LastAdmin)
        );
        assert_eq!(
            service.add_candidate(&admin, e, "Bob"),
            Err(LedgerError::Unauthorized)
        );
    }

    #[test]
    fn report_and_ballot_pages() {
        let (service, clock) = service();
        let admin = Identity::example_admin();
        let e = board_vote(&service);
        let voters = [
            Identity::example_voter1(),
            Identity::example_voter2(),
            Identity::example_outsider(),
        ];
        for voter in voters {
            service.add_eligible_voter(&admin, e, voter).unwrap();
        }
        service.cast_vote(e, voters[0], 2).unwrap();
        service.cast_vote(e, voters[1], 2).unwrap();

        clock.advance(Duration::seconds(100));
        let report = service.report(e).unwrap();
        assert!(report.active);
        assert_eq!(report.remaining, Duration::seconds(500));
        assert_eq!(report.eligible_voters, 3);
        assert_eq!(report.ballots_cast, 2);
        assert_eq!(report.election.total_votes(), 2);

        let (total, page) = service.ballots_page(e, 1, 10).unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].voter, voters[1]);
        assert_eq!(service.has_voted(e, &voters[2]), Ok(false));
        assert_eq!(
            service.ballots_page(5, 0, 10),
            Err(LedgerError::ElectionNotFound(5))
        );
    }

    #[test]
    fn concurrent_votes_are_counted_once() {
        let (service, _) = service();
        let admin = Identity::example_admin();
        let e = board_vote(&service);
        let voters: Vec<_> = (0..16u8)
            .map(|i| Identity::from_bytes([i; crate::model::common::IDENTITY_LEN]))
            .collect();
        for voter in &voters {
            service.add_eligible_voter(&admin, e, *voter).unwrap();
        }

        // Every voter tries to vote from several threads at once.
        let accepted = std::thread::scope(|scope| {
            let handles: Vec<_> = voters
                .iter()
                .flat_map(|voter| (0..4).map(move |attempt| (*voter, attempt)))
                .map(|(voter, attempt)| {
                    let service = &service;
                    scope.spawn(move || service.cast_vote(e, voter, attempt % 3).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or(false))
                .filter(|accepted| *accepted)
                .count()
        });

        assert_eq!(accepted, voters.len());
        let total: u64 = service.tally(e).unwrap().iter().map(|(_, votes)| votes).sum();
        assert_eq!(total, voters.len() as u64);
        assert_eq!(service.report(e).unwrap().ballots_cast, voters.len());
    }
}
