use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    ledger::ElectionService,
    model::{
        api::{
            admin::AdminStatus,
            ballot::{BallotDescription, Eligibility, VotedCandidate},
            election::{
                CandidateTally, CurrentElection, ElectionDescription, ElectionResults,
                ElectionSummary, RemainingTime, VotingStatus,
            },
            pagination::{Paginated, PaginationRequest},
        },
        common::{ElectionId, Identity, IdentityError},
    },
};

/// A path-supplied identity, malformed values included so they can be reported.
type IdentityParam = std::result::Result<Identity, IdentityError>;

pub fn routes() -> Vec<Route> {
    routes![
        is_admin,
        elections,
        active_elections,
        current_election,
        election,
        voting_status,
        remaining_time,
        tally,
        results,
        ballots,
        voted_candidate,
        eligibility,
    ]
}

#[get("/admins/<identity>")]
fn is_admin(identity: IdentityParam, ledger: &State<ElectionService>) -> Result<Json<AdminStatus>> {
    let identity = identity?;
    Ok(Json(AdminStatus {
        identity,
        admin: ledger.is_admin(&identity),
    }))
}

/// All elections with their stored active flag.
#[get("/elections")]
fn elections(ledger: &State<ElectionService>) -> Json<Vec<ElectionSummary>> {
    Json(ledger.list_all().into_iter().map(Into::into).collect())
}

/// Elections currently accepting votes.
#[get("/elections/active")]
fn active_elections(ledger: &State<ElectionService>) -> Json<Vec<ElectionSummary>> {
    Json(ledger.list_active().into_iter().map(Into::into).collect())
}

#[get("/elections/current")]
fn current_election(ledger: &State<ElectionService>) -> Result<Json<CurrentElection>> {
    let id = ledger.current_election()?;
    Ok(Json(CurrentElection { id }))
}

#[get("/elections/<election_id>")]
fn election(
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<ElectionDescription>> {
    let report = ledger.report(election_id)?;
    Ok(Json((&report).into()))
}

#[get("/elections/<election_id>/status")]
fn voting_status(
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<VotingStatus>> {
    let active = ledger.voting_status(election_id)?;
    Ok(Json(VotingStatus { active }))
}

#[get("/elections/<election_id>/remaining")]
fn remaining_time(
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<RemainingTime>> {
    Ok(Json(ledger.remaining_time(election_id)?.into()))
}

#[get("/elections/<election_id>/tally")]
fn tally(
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<Vec<CandidateTally>>> {
    let tally = ledger
        .tally(election_id)?
        .into_iter()
        .zip(0..)
        .map(|((name, votes), index)| CandidateTally { index, name, votes })
        .collect();
    Ok(Json(tally))
}

#[get("/elections/<election_id>/results")]
fn results(
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<ElectionResults>> {
    let report = ledger.report(election_id)?;
    Ok(Json((&report).into()))
}

#[get("/elections/<election_id>/ballots?<pagination..>")]
fn ballots(
    election_id: ElectionId,
    pagination: PaginationRequest,
    ledger: &State<ElectionService>,
) -> Result<Json<Paginated<BallotDescription>>> {
    let (total, page) =
        ledger.ballots_page(election_id, pagination.skip(), pagination.page_size())?;
    let page = page.into_iter().map(Into::into).collect();
    Ok(Json(pagination.to_paginated(total, page)))
}

#[get("/elections/<election_id>/voters/<identity>/vote")]
fn voted_candidate(
    election_id: ElectionId,
    identity: IdentityParam,
    ledger: &State<ElectionService>,
) -> Result<Json<VotedCandidate>> {
    let candidate = ledger.voted_candidate(election_id, &identity?)?;
    Ok(Json(VotedCandidate { candidate }))
}

#[get("/elections/<election_id>/voters/<identity>/eligible")]
fn eligibility(
    election_id: ElectionId,
    identity: IdentityParam,
    ledger: &State<ElectionService>,
) -> Result<Json<Eligibility>> {
    let eligible = ledger.is_eligible(election_id, &identity?)?;
    Ok(Json(Eligibility { eligible }))
}
