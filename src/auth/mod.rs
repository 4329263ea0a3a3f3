//! Turns the bearer credential on a request into a verified user ID.
//!
//! Handlers receive the caller's identity through the [AuthenticatedUser]
//! extractor. The extractor runs before the request body is read and before
//! any store access, so unauthenticated requests never touch the database.

mod token;

use std::{fmt::Display, sync::Arc};

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

pub use token::{Claims, JwtIdentityResolver, issue_token};

/// The ID of a user, as issued by the identity provider.
///
/// The ID is opaque to this application (typically a UUID). It is only ever
/// compared against the `user_id` column of the ownership join tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Verifies credentials against an identity backend.
pub trait IdentityResolver: Send + Sync {
    /// Resolve `credential` into the ID of the user it was issued to.
    ///
    /// # Errors
    /// Returns [Error::Unauthenticated] if the credential is malformed,
    /// expired or rejected. Implementations must not retry or cache.
    fn resolve(&self, credential: &str) -> Result<UserId, Error>;
}

/// The state needed to authenticate requests.
#[derive(Clone)]
pub struct IdentityState {
    /// The resolver used to verify bearer tokens.
    pub resolver: Arc<dyn IdentityResolver>,
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            resolver: state.identity.clone(),
        }
    }
}

/// The verified identity of the caller.
///
/// Extracting this from a request fails with [Error::Unauthenticated] when
/// the `Authorization` header is missing, is not a bearer token, or holds a
/// token the [IdentityResolver] rejects.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    IdentityState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                tracing::debug!("Rejecting request without a bearer token: {rejection}");
                Error::Unauthenticated
            })?;

        let identity = IdentityState::from_ref(state);
        let user_id = identity.resolver.resolve(bearer.token())?;

        Ok(AuthenticatedUser(user_id))
    }
}
