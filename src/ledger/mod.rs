//! The election ledger: the state machine deciding who may create elections, who may
//! vote, and how each ballot is counted exactly once.
//!
//! Everything here is synchronous and free of I/O. [`ElectionService`] is the only
//! entry point that callers outside this module should need.

mod access;
mod ballot;
mod clock;
mod eligibility;
mod error;
mod gating;
mod registry;
mod service;

pub use access::AccessControl;
pub use ballot::{BallotLedger, BallotRecord};
pub use clock::{Clock, MockClock, SystemClock};
pub use eligibility::EligibilityRegistry;
pub use error::{LedgerError, LedgerResult};
pub use gating::{GatingPolicy, KycAttestation, ProofVerifier, RejectAll};
pub use registry::{Candidate, Election, ElectionListing, ElectionRegistry};
pub use service::{ElectionReport, ElectionService};
