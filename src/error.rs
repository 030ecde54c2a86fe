use jsonwebtoken::errors::Error as JwtError;
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::logging::record_failure;
use crate::model::{api::auth::LoginError, common::IdentityError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Status(Status::Unauthorized, message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Ledger(err) => match err {
                LedgerError::Unauthorized
                | LedgerError::NotEligible { .. }
                | LedgerError::ProofRejected { .. } => Status::Forbidden,
                LedgerError::ElectionNotFound(_)
                | LedgerError::HasNotVoted { .. }
                | LedgerError::NoElections => Status::NotFound,
                LedgerError::ElectionNotActive(_)
                | LedgerError::ElectionAlreadyEnded(_)
                | LedgerError::AlreadyVoted { .. }
                | LedgerError::LastAdmin => Status::Conflict,
                LedgerError::InvalidCandidate { .. } | LedgerError::InvalidArgument(_) => {
                    Status::UnprocessableEntity
                }
            },
            Self::Jwt(_) => Status::Unauthorized,
            Self::Identity(_) => Status::BadRequest,
            Self::Login(LoginError::BadSignature) => Status::Unauthorized,
            Self::Login(_) => Status::BadRequest,
            Self::Status(status, _) => *status,
        }
    }

    /// Machine-readable name of the failure, reported as `error` in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.kind(),
            Self::Jwt(_) => "InvalidToken",
            Self::Identity(_) => "MalformedIdentity",
            Self::Login(LoginError::BadSignature) => "BadSignature",
            Self::Login(_) => "MalformedLogin",
            Self::Status(status, _) => kind_for_status(*status),
        }
    }
}

/// Error kind for failures that only carry an HTTP status.
pub fn kind_for_status(status: Status) -> &'static str {
    match status.code {
        400 => "BadRequest",
        401 => "Unauthenticated",
        403 => "Forbidden",
        404 => "NotFound",
        422 => "MalformedBody",
        _ if status.class() == StatusClass::ServerError => "Internal",
        _ => "Error",
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        record_failure(req, self.kind());
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::common::Identity;

    use super::*;

    #[test]
    fn ledger_errors_map_to_distinct_kinds() {
        let voter = Identity::example_voter1();
        let cases = [
            (LedgerError::Unauthorized, Status::Forbidden),
            (LedgerError::ElectionNotFound(3), Status::NotFound),
            (LedgerError::ElectionNotActive(3), Status::Conflict),
            (LedgerError::ElectionAlreadyEnded(3), Status::Conflict),
            (
                LedgerError::NotEligible {
                    election: 3,
                    voter,
                },
                Status::Forbidden,
            ),
            (
                LedgerError::AlreadyVoted {
                    election: 3,
                    voter,
                },
                Status::Conflict,
            ),
            (
                LedgerError::InvalidCandidate {
                    election: 3,
                    index: 9,
                    count: 2,
                },
                Status::UnprocessableEntity,
            ),
            (
                LedgerError::HasNotVoted {
                    election: 3,
                    voter,
                },
                Status::NotFound,
            ),
            (LedgerError::NoElections, Status::NotFound),
            (LedgerError::LastAdmin, Status::Conflict),
            (
                LedgerError::ProofRejected {
                    election: 3,
                    voter,
                },
                Status::Forbidden,
            ),
            (
                LedgerError::InvalidArgument("empty".to_string()),
                Status::UnprocessableEntity,
            ),
        ];

        let mut kinds = Vec::new();
        for (ledger_error, status) in cases {
            let error = Error::from(ledger_error);
            assert_eq!(error.status(), status);
            kinds.push(error.kind());
        }
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), 12);
    }

    #[test]
    fn request_errors() {
        assert_eq!(Error::bad_request("nope").status(), Status::BadRequest);
        assert_eq!(Error::bad_request("nope").kind(), "BadRequest");
        assert_eq!(Error::unauthenticated("who?").kind(), "Unauthenticated");
        assert_eq!(
            Error::from(IdentityError::BadHex).status(),
            Status::BadRequest
        );
    }
}
