//! Verifies and issues the JSON Web Tokens used as bearer credentials.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{IdentityResolver, UserId},
};

/// The contents of a JSON Web Token.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// The expiry time of the token as a unix timestamp.
    pub exp: u64,
    /// The time the token was issued as a unix timestamp.
    pub iat: u64,
    /// The intended audience of the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Verifies HS256 tokens signed with a shared secret.
///
/// The token must not be expired and must carry a non-blank `sub` claim
/// without leading or trailing whitespace. If an audience is configured, the
/// `aud` claim must match it.
#[derive(Clone)]
pub struct JwtIdentityResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    /// Create a resolver for tokens signed with `secret`.
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);

        match audience {
            Some(audience) => {
                validation.set_required_spec_claims(&["exp", "sub", "aud"]);
                validation.set_audience(&[audience]);
            }
            None => {
                validation.set_required_spec_claims(&["exp", "sub"]);
                validation.validate_aud = false;
            }
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, credential: &str) -> Result<UserId, Error> {
        let token_data = decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map_err(|error| {
                tracing::debug!("Rejected bearer token: {error}");
                Error::Unauthenticated
            })?;

        let subject = token_data.claims.sub;

        if subject.trim().is_empty() {
            tracing::debug!("Rejected bearer token with an empty subject");
            return Err(Error::Unauthenticated);
        }

        // User IDs are compared byte for byte, so " U1" must not become "U1".
        if subject.trim() != subject {
            tracing::debug!("Rejected bearer token with whitespace around the subject");
            return Err(Error::Unauthenticated);
        }

        Ok(UserId::new(subject))
    }
}

/// Create a signed token for `user_id` that expires after `ttl`.
///
/// # Errors
/// Returns [Error::TokenCreation] if the token could not be encoded.
pub fn issue_token(
    secret: &str,
    user_id: &UserId,
    audience: Option<&str>,
    ttl: Duration,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: unix_timestamp(now + ttl),
        iat: unix_timestamp(now),
        aud: audience.map(str::to_owned),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|error| Error::TokenCreation(error.to_string()))
}

fn unix_timestamp(date_time: OffsetDateTime) -> u64 {
    u64::try_from(date_time.unix_timestamp()).unwrap_or_default()
}
