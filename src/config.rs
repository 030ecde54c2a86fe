use std::sync::Arc;

use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::ledger::{ElectionService, GatingPolicy, KycAttestation, SystemClock};
use crate::model::common::{Identity, SybilMethod};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    challenge_ttl: u32,
    default_duration: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Valid lifetime of login challenges in seconds.
    pub fn challenge_ttl(&self) -> Duration {
        Duration::seconds(self.challenge_ttl.into())
    }

    /// Voting window used when an election is created without one.
    pub fn default_duration(&self) -> Duration {
        Duration::seconds(self.default_duration.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}


/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// An election created by the bootstrap admin at startup.
#[derive(Deserialize)]
struct InitialElection {
    name: String,
    #[serde(default)]
    sybil_method: SybilMethod,
    #[serde(default)]
    candidates: Vec<String>,
    duration: u32,
}

/// Configuration for the ledger itself.
#[derive(Deserialize)]
struct LedgerConfig {
    // non-secrets
    admin_identity: Identity,
    initial_election: Option<InitialElection>,
    // secrets
    kyc_secret: Option<String>,
}

impl LedgerConfig {
    /// Build the service this config describes, including its initial election.
    fn into_service(self) -> Result<ElectionService, String> {
        let mut gating = GatingPolicy::default();
        if let Some(secret) = &self.kyc_secret {
            gating = gating.with_kyc(KycAttestation::new(secret));
            info!("KYC attestations enabled");
        }
        let service =
            ElectionService::bootstrap(self.admin_identity, Arc::new(SystemClock), gating);

        if let Some(initial) = self.initial_election {
            service
                .create_election_with_candidates(
                    &self.admin_identity,
                    &initial.name,
                    initial.sybil_method,
                    Duration::seconds(initial.duration.into()),
                    initial.candidates.as_slice(),
                )
                .map_err(|e| format!("Failed to create initial election: {e}"))?;
        }
        Ok(service)
    }
}

/// A fairing that loads the ledger config, bootstraps the election ledger
/// and places the resulting [`ElectionService`] into managed state.
pub struct LedgerFairing;

#[rocket::async_trait]
impl Fairing for LedgerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election ledger",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<LedgerConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load ledger config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let service = match config.into_service() {
            Ok(service) => service,
            Err(e) => {
                error!("{e}");
                return Err(rocket);
            }
        };
        info!("Election ledger online");

        // Manage the state.
        rocket = rocket.manage(service);
        Ok(rocket)
    }
}
