use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{errors::Error as JwtError, DecodingKey, EncodingKey, Header, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::common::Identity;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token proving its bearer controls a specific identity.
///
/// Admin rights are not part of the token: the ledger checks them on every operation,
/// so revoking an admin takes effect immediately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    pub identity: Identity,
}

impl AuthToken {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// Sign this token into a JWT that expires after the configured auth TTL.
    pub fn encode(self, config: &Config) -> Result<String, JwtError> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>, JwtError> {
        let token = self.encode(config)?;
        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Verify and decode a JWT.
    pub fn decode(token: &str, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data| data.claims.token)
    }
}

/// Token claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get an [`AuthToken`] from the `auth_token` cookie, or failing that from an
    /// `Authorization: Bearer` header.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = try_outcome!(req.rocket().state::<Config>().into_outcome((
            Status::InternalServerError,
            Error::Status(Status::InternalServerError, "Config not managed".to_string()),
        )));

        let raw = req
            .cookies()
            .get(AUTH_TOKEN_COOKIE)
            .map(Cookie::value)
            .or_else(|| {
                req.headers()
                    .get_one("Authorization")
                    .and_then(|header| header.strip_prefix("Bearer "))
            });
        let raw = try_outcome!(raw.into_outcome((
            Status::Unauthorized,
            Error::unauthenticated("Missing auth token"),
        )));

        Self::decode(raw, config)
            .map_err(Error::from)
            .into_outcome(Status::Unauthorized)
    }
}
