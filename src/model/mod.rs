//! Data types shared between the ledger and the HTTP API.

pub mod api;
pub mod auth;
pub mod common;
