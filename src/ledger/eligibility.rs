use std::collections::{HashMap, HashSet};

use crate::model::common::{ElectionId, Identity};

/// Per-election allow-list of voters.
///
/// Only membership is stored. How an entry got here (admin allow-listing or a verified
/// proof) is decided by the election's Sybil-resistance method, not recorded per entry.
#[derive(Debug, Default, Clone)]
pub struct EligibilityRegistry {
    eligible: HashMap<ElectionId, HashSet<Identity>>,
}

impl EligibilityRegistry {
    /// Mark `voter` eligible. Returns whether the entry is new.
    pub fn add(&mut self, election_id: ElectionId, voter: Identity) -> bool {
        self.eligible.entry(election_id).or_default().insert(voter)
    }

    pub fn is_eligible(&self, election_id: ElectionId, voter: &Identity) -> bool {
        self.eligible
            .get(&election_id)
            .map_or(false, |voters| voters.contains(voter))
    }

    /// Number of identities eligible in the given election.
    pub fn eligible_count(&self, election_id: ElectionId) -> usize {
        self.eligible.get(&election_id).map_or(0, HashSet::len)
    }
}
