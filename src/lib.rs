#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, LedgerFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod model;

/// Assemble the server: routes, JSON error catchers, config, the election
/// ledger and request logging.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .attach(LedgerFairing)
        .attach(LoggerFairing)
}

/// A server with example config whose ledger runs on `clock`, administered by
/// the example admin key and accepting example KYC attestations.
#[cfg(test)]
pub(crate) fn rocket_for_tests(clock: ledger::MockClock) -> Rocket<Build> {
    use std::sync::Arc;

    use crate::config::Config;
    use crate::ledger::{ElectionService, GatingPolicy, KycAttestation};
    use crate::model::auth::examples::{admin_key, identity_of, KYC_SECRET};

    let ledger = ElectionService::bootstrap(
        identity_of(&admin_key()),
        Arc::new(clock),
        GatingPolicy::default().with_kyc(KycAttestation::new(KYC_SECRET)),
    );
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .manage(Config::example())
        .manage(ledger)
        .attach(LoggerFairing)
}
