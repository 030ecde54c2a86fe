use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::StatusClass,
    request::{FromRequest, Outcome},
    Data, Orbit, Request, Response, Rocket,
};

use crate::ledger::ElectionService;
use crate::model::auth::AuthToken;

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. Wraps around to zero on overflow.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RequestId {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(req.local_cache(RequestId::next))
    }
}

/// The error kind a request failed with, as reported in the JSON error body.
#[derive(Debug, Copy, Clone)]
struct FailureKind(&'static str);

/// Remember why `req` failed so the response log line can name it.
/// Only the first call per request has an effect, and it must precede any lookup.
pub fn record_failure(req: &Request<'_>, kind: &'static str) {
    req.local_cache(|| Some(FailureKind(kind)));
}

fn recorded_failure(req: &Request<'_>) -> Option<&'static str> {
    req.local_cache(|| None::<FailureKind>).map(|kind| kind.0)
}

/// Request and response logging, plus a summary of the ledger at launch and shutdown.
///
/// Response lines name the authenticated caller, if any, and the error kind of
/// failed requests:
///
/// ```text
/// ->req7 POST /elections/0/vote
/// <-rsp7 409 Conflict vote (/elections/<election_id>/vote) by 0x1a2b..: AlreadyVoted
/// ```
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

impl LoggerFairing {
    fn ledger_summary(rocket: &Rocket<Orbit>) -> Option<String> {
        let ledger = rocket.state::<ElectionService>()?;
        let elections = ledger.list_all();
        let ballots: usize = elections
            .iter()
            .filter_map(|listing| ledger.report(listing.id).ok())
            .map(|report| report.ballots_cast)
            .sum();
        Some(format!(
            "{} election(s), {} active, {ballots} ballot(s), {} admin(s)",
            elections.len(),
            ledger.list_active().len(),
            ledger.admins().len()
        ))
    }
}

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let protocol = if rocket.config().tls_enabled() {
            "https"
        } else {
            "http"
        };
        let ip = &rocket.config().address;
        let port = &rocket.config().port;
        info!("Ledger listening on {protocol}://{ip}:{port}");
        if let Some(summary) = Self::ledger_summary(rocket) {
            info!("Ledger holds {summary}");
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = req.local_cache(RequestId::next);
        info!("->req{id} {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let code = res.status();
        let route = req
            .route()
            .map(|r| match r.name {
                Some(ref name) => format!("{name} ({})", r.uri),
                None => r.uri.to_string(),
            })
            .unwrap_or_else(|| "UNKNOWN ROUTE".to_string());
        let caller = match req.guard::<AuthToken>().await {
            Outcome::Success(token) => format!(" by {}", token.identity),
            _ => String::new(),
        };
        let failure = recorded_failure(req)
            .map(|kind| format!(": {kind}"))
            .unwrap_or_default();

        let log_msg = format!("<-rsp{id} {code} {route}{caller}{failure}");
        match code.class() {
            StatusClass::ServerError => error!("{log_msg}"),
            StatusClass::ClientError => warn!("{log_msg}"),
            _ => info!("{log_msg}"),
        }
    }

    async fn on_shutdown(&self, rocket: &Rocket<Orbit>) {
        match Self::ledger_summary(rocket) {
            Some(summary) => warn!("Shutting down, discarding in-memory ledger of {summary}"),
            None => warn!("Shutting down"),
        }
    }
}
