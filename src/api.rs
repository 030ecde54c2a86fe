use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::{kind_for_status, ErrorBody};
use crate::logging::record_failure;

mod admin;
mod auth;
mod public;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(voter::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Give failures raised outside a handler (unknown routes, failed guards, bad bodies)
/// the same JSON shape as handler errors.
#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> (Status, Json<ErrorBody>) {
    let kind = kind_for_status(status);
    record_failure(req, kind);
    let body = ErrorBody {
        error: kind,
        message: format!("{} {}: {}", req.method(), req.uri(), status.reason_lossy()),
    };
    (status, Json(body))
}
