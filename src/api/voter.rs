use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    ledger::ElectionService,
    model::{
        api::ballot::{Eligibility, RegistrationSpec, VoteSpec, VotedCandidate},
        auth::AuthToken,
        common::ElectionId,
    },
};

pub fn routes() -> Vec<Route> {
    routes![register, vote, my_vote]
}

/// Self-registration with a proof for the election's Sybil-resistance method.
#[post("/elections/<election_id>/register", data = "<registration>", format = "json")]
fn register(
    token: AuthToken,
    election_id: ElectionId,
    registration: Json<RegistrationSpec>,
    ledger: &State<ElectionService>,
) -> Result<Json<Eligibility>> {
    let proof = registration
        .proof_bytes()
        .map_err(|_| Error::bad_request("`proof` must be hex-encoded"))?;
    ledger.register_voter(election_id, token.identity, &proof)?;
    Ok(Json(Eligibility { eligible: true }))
}

#[post("/elections/<election_id>/vote", data = "<ballot>", format = "json")]
fn vote(
    token: AuthToken,
    election_id: ElectionId,
    ballot: Json<VoteSpec>,
    ledger: &State<ElectionService>,
) -> Result<Json<VotedCandidate>> {
    ledger.cast_vote(election_id, token.identity, ballot.candidate)?;
    let candidate = ledger.voted_candidate(election_id, &token.identity)?;
    Ok(Json(VotedCandidate { candidate }))
}

#[get("/elections/<election_id>/vote")]
fn my_vote(
    token: AuthToken,
    election_id: ElectionId,
    ledger: &State<ElectionService>,
) -> Result<Json<VotedCandidate>> {
    let candidate = ledger.voted_candidate(election_id, &token.identity)?;
    Ok(Json(VotedCandidate { candidate }))
}
