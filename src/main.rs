use log::{error, info, warn, LevelFilter};
use rocket::Error as RocketError;
use thiserror::Error;

use dvote_ledger::{ledger::ElectionService, model::common::ElectionState};

/// Errors that are critical to the entire server.
#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    RocketError(#[from] RocketError),
    #[error("Election ledger missing after ignition")]
    NoLedger,
}

/// Report what the freshly bootstrapped ledger holds.
fn describe_ledger(ledger: &ElectionService) {
    match ledger.current_election().and_then(|id| ledger.election(id)) {
        Ok(election) => {
            let state = match election.state() {
                ElectionState::Active => "accepting votes",
                ElectionState::Ended => "ended",
            };
            info!(
                "Current election {} \"{}\" is {state} with {} candidate(s)",
                election.id(),
                election.name(),
                election.candidates().len()
            );
        }
        Err(_) => info!("No elections yet, waiting for an admin to create one"),
    }
    for admin in ledger.admins() {
        info!("Admin: {admin}");
    }
    warn!("Ledger state is kept in memory only and is lost on shutdown");
}

async fn run() -> Result<(), Error> {
    info!("Starting dvote-ledger {}", env!("CARGO_PKG_VERSION"));
    let rocket = dvote_ledger::build().ignite().await?;
    describe_ledger(rocket.state::<ElectionService>().ok_or(Error::NoLedger)?);

    // Our logger fairing reports requests from here on.
    log4rs_dynamic_filters::DynamicLevelFilter::set("rocket", LevelFilter::Off);
    let _ = rocket.launch().await?;
    Ok(())
}

#[rocket::main]
async fn main() {
    log4rs::init_file("log4rs.yaml", log4rs_dynamic_filters::default_deserializers())
        .expect("Failed to initialise logging");

    if let Err(err) = run().await {
        error!("{err}");
        error!("Critical failure, shutting down");
        std::process::exit(1)
    }
}
