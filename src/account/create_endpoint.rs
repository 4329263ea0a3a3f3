//! Defines the endpoint for creating a new account.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::AuthenticatedUser,
    orchestrator,
    record::{EntityKind, NewEntity},
    response::CreatedResponse,
    stores::StoreState,
    validation::{ValidJson, Validate, validate_amount, validate_name},
};

/// The body of a request to create an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAccountRequest {
    /// The account name (number)
    pub name: String,
    /// The balance in dollars.
    pub balance: f64,
}

impl Validate for CreateAccountRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)?;
        validate_amount("balance", self.balance)
    }
}

/// A route handler for creating a new account owned by the caller.
pub async fn create_account_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<CreateAccountRequest>,
) -> Result<Json<CreatedResponse>, Error> {
    let new_account = NewEntity::Account {
        name: request.name,
        balance: request.balance,
    };
    let account_id = orchestrator::create(state.store.as_ref(), &new_account, &user_id)?;

    Ok(Json(CreatedResponse::new(EntityKind::Account, account_id)))
}
