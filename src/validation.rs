//! Checks request bodies and path parameters before they reach the store.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::Error;

/// The longest name accepted for any record, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// A request body that can check its own contents.
pub trait Validate {
    /// Check the fields of the request body.
    ///
    /// # Errors
    /// Returns [Error::Validation] describing the first invalid field.
    fn validate(&self) -> Result<(), Error>;
}

/// A JSON request body that has been deserialized and validated.
///
/// Rejects bodies that are not valid JSON, do not match `T`, or fail
/// [Validate::validate] with [Error::Validation].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Rejected request body: {rejection}");
                Error::Validation(rejection.body_text())
            })?;

        body.validate()?;

        Ok(ValidJson(body))
    }
}

/// Path parameters that have been deserialized.
///
/// Rejects parameters that do not match `T`, e.g. a record ID that is not an
/// integer, with [Error::Validation] so the caller gets a JSON error body.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Rejected path parameters: {rejection}");
                Error::Validation(rejection.body_text())
            })?;

        Ok(ValidPath(params))
    }
}

/// Check that the `field` name is not blank and not too long.
///
/// # Errors
/// Returns [Error::Validation] if the name is empty after trimming or longer
/// than [MAX_NAME_LENGTH] characters.
pub fn validate_name(field: &str, name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation(format!("{field} cannot be empty")));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "{field} cannot be longer than {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Check that the `field` amount is a finite number.
///
/// # Errors
/// Returns [Error::Validation] for NaN and infinite amounts.
pub fn validate_amount(field: &str, amount: f64) -> Result<(), Error> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(Error::Validation(format!("{field} must be a finite number")))
    }
}
