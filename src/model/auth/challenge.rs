use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{errors::Error as JwtError, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{self, FromRequest},
    time::Duration,
    Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;

pub const CHALLENGE_COOKIE: &str = "challenge";

/// Number of random bytes a client must sign to log in.
pub const NONCE_LEN: usize = 32;

/// A login challenge: a random nonce the client proves key ownership over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(rename = "non")]
    pub nonce: [u8; NONCE_LEN],
}

impl Challenge {
    /// Create a new challenge with a random nonce.
    pub fn random() -> Self {
        Self {
            nonce: rand::thread_rng().gen(),
        }
    }

    /// Convert into a cookie, to be stored privately.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>, JwtError> {
        let claims = Claims {
            challenge: self,
            expire_at: Utc::now() + config.challenge_ttl(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;
        Ok(Cookie::build(CHALLENGE_COOKIE, token)
            .max_age(Duration::seconds(config.challenge_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a challenge from a cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode::<Claims>(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data| data.claims.challenge)
    }
}

/// Cookie claims: the challenge itself plus an expiry datetime.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    challenge: Challenge,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Challenge {
    type Error = Error;

    /// Get the challenge from the private cookie.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = try_outcome!(req.rocket().state::<Config>().into_outcome((
            Status::InternalServerError,
            Error::Status(Status::InternalServerError, "Config not managed".to_string()),
        )));

        let cookie = try_outcome!(req.cookies().get_private(CHALLENGE_COOKIE).into_outcome((
            Status::Unauthorized,
            Error::unauthenticated("Missing `challenge` cookie"),
        )));

        Challenge::from_cookie(&cookie, config)
            .map_err(Error::from)
            .into_outcome(Status::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_are_unique() {
        assert_ne!(Challenge::random(), Challenge::random());
    }

    #[test]
    fn cookie_round_trip_and_tamper() {
        let config = Config::example();
        let challenge = Challenge::random();
        let cookie = challenge.clone().into_cookie(&config).unwrap();
        assert_eq!(Challenge::from_cookie(&cookie, &config).unwrap(), challenge);

        let mut tampered = cookie.value().to_string();
        tampered.push('x');
        let tampered = Cookie::new(CHALLENGE_COOKIE, tampered);
        assert!(Challenge::from_cookie(&tampered, &config).is_err());
    }
}
