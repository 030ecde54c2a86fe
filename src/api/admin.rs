use rocket::{serde::json::Json, Route, State};

use crate::{
    config::Config,
    error::Result,
    ledger::{ElectionService, LedgerError},
    model::{
        api::{
            admin::{AdminStatus, IdentitySpec},
            election::{CandidateAdded, CandidateSpec, ElectionDescription, ElectionSpec},
        },
        auth::AuthToken,
        common::{ElectionId, Identity, IdentityError},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_admins,
        grant_admin,
        revoke_admin,
        create_election,
        add_candidate,
        add_candidate_to_current,
        end_election,
        end_current_election,
        add_eligible_voter,
    ]
}

#[get("/admins")]
fn get_admins(token: AuthToken, ledger: &State<ElectionService>) -> Result<Json<Vec<Identity>>> {
    if !ledger.is_admin(&token.identity) {
        return Err(LedgerError::Unauthorized.into());
    }
    Ok(Json(ledger.admins()))
}

#[post("/admins", data = "<spec>", format = "json")]
fn grant_admin(
    token: AuthToken,
    spec: Json<IdentitySpec>,
    ledger: &State<ElectionService>,
) -> Result<Json<AdminStatus>> {
    ledger.grant_admin(&token.identity, spec.identity)?;
    Ok(Json(AdminStatus {
        identity: spec.identity,
        admin: true,
    }))
}

#[delete("/admins/<identity>")]
fn revoke_admin(
    token: AuthToken,
    identity: std::result::Result<Identity, IdentityError>,
    ledger: &State<ElectionService>,
) -> Result<Json<AdminStatus>> {
    let identity = identity?;
    ledger.revoke_admin(&token.identity, &identity)?;
    Ok(Json(AdminStatus {
        identity,
        admin: false,
    }))
}

#[post("/elections", data = "<spec>", format = "json")]
fn create_election(
    token: AuthToken,
    spec: Json<ElectionSpec>,
    ledger: &State<ElectionService>,
    config: &State<Config>,
) -> Result<Json<ElectionDescription>> {
    let election_id = ledger.create_election_with_candidates(
        &token.identity,
        &spec.name,
        spec.sybil_method,
        spec.duration(config.default_duration()),
        spec.candidates.as_slice(),
    )?;
    let report = ledger.report(election_id)?;
    Ok(Json((&report).into()))
}

#[post("/elections/<election_id>/candidates", data = "<spec>", format = "json")]
fn add_candidate(
    token: AuthToken,
    election_id: ElectionId,
    spec: Json<CandidateSpec>,
    ledger: &State<ElectionService>,
) -> Result<Json<CandidateAdded>> {
    let index = ledger.add_candidate(&token.identity, election_id, &spec.name)?;
    Ok(Json(CandidateAdded {
        election: election_id,
        index,
    }))
}

#[post("/elections/current/candidates", data = "<spec>", format = "json")]
fn add_candidate_to_current(
    token: AuthToken,
    spec: Json<CandidateSpec>,
    ledger: &State<ElectionService>,
) -> Result<Json<CandidateAdded>> {
    let (election, index) = ledger.add_candidate_to_current(&token.identity, &spec.name)?;
    Ok(Json(CandidateAdded { election, index }))
}

#[post("/elections/<election_id>/end")]
fn end_election(
    token: AuthToken,
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<ElectionDescription>> {
    ledger.end_election(&token.identity, election_id)?;
    let report = ledger.report(election_id)?;
    Ok(Json((&report).into()))
}

#[post("/elections/current/end")]
fn end_current_election(
    token: AuthToken,
    ledger: &State<ElectionService>,
) -> Result<Json<ElectionDescription>> {
    let election_id = ledger.end_current_election(&token.identity)?;
    let report = ledger.report(election_id)?;
    Ok(Json((&report).into()))
}

#[post("/elections/<election_id>/voters", data = "<spec>", format = "json")]
fn add_eligible_voter(
    token: AuthToken,
    election_id: ElectionId,
    spec: Json<IdentitySpec>,
    ledger: &State<ElectionService>,
) -> Result<()> {
    ledger.add_eligible_voter(&token.identity, election_id, spec.identity)?;
    Ok(())
}
