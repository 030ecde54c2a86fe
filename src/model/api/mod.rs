//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Identities are serialised as `0x`-prefixed hex strings.
//! - Datetimes are serialised as timestamps.
//! - Durations are serialised as whole seconds.

pub mod admin;
pub mod auth;
pub mod ballot;
pub mod election;
pub mod pagination;
