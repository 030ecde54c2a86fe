use log::info;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::Result,
    ledger::ElectionService,
    logging::RequestId,
    model::{
        api::{
            admin::AdminStatus,
            auth::{ChallengeResponse, LoginRequest},
        },
        auth::{AuthToken, Challenge, AUTH_TOKEN_COOKIE, CHALLENGE_COOKIE},
    },
};

pub fn routes() -> Vec<Route> {
    routes![challenge, verify, logout, whoami]
}

#[get("/auth/challenge")]
fn challenge(cookies: &CookieJar<'_>, config: &State<Config>) -> Result<Json<ChallengeResponse>> {
    let challenge = Challenge::random();
    let response = ChallengeResponse::new(&challenge.nonce);
    cookies.add_private(challenge.into_cookie(config)?);
    Ok(Json(response))
}

#[post("/auth/verify", data = "<login>", format = "json")]
fn verify(
    login: Json<LoginRequest>,
    challenge: Challenge,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
    ledger: &State<ElectionService>,
    request_id: &RequestId,
) -> Result<Json<AdminStatus>> {
    let identity = login.verify(&challenge.nonce)?;

    let token = AuthToken::new(identity);
    cookies.add(token.into_cookie(config)?);

    // A challenge may only be answered once.
    cookies.remove_private(Cookie::named(CHALLENGE_COOKIE));

    info!("req{request_id}: {identity} logged in");
    Ok(Json(AdminStatus {
        identity,
        admin: ledger.is_admin(&identity),
    }))
}

#[delete("/auth")]
fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[get("/whoami")]
fn whoami(token: AuthToken, ledger: &State<ElectionService>) -> Json<AdminStatus> {
    Json(AdminStatus {
        identity: token.identity,
        admin: ledger.is_admin(&token.identity),
    })
}
