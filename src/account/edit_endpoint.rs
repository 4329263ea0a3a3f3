//! Defines the endpoint for updating an account.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::AuthenticatedUser,
    record::{Attributes, EntityKind, RecordId},
    response::MessageResponse,
    stores::StoreState,
    update_guard,
    validation::{ValidJson, Validate, validate_amount, validate_name},
};

/// The body of a request to update an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditAccountRequest {
    /// The account to update.
    pub account_id: RecordId,
    /// The new name.
    pub name: String,
    /// The new balance in dollars.
    pub balance: f64,
}

impl Validate for EditAccountRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)?;
        validate_amount("balance", self.balance)
    }
}

/// A route handler for overwriting the name and balance of one of the
/// caller's accounts.
pub async fn edit_account_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<EditAccountRequest>,
) -> Result<Json<MessageResponse>, Error> {
    let attributes = Attributes::Account {
        name: request.name,
        balance: request.balance,
    };

    update_guard::update(state.store.as_ref(), request.account_id, &user_id, &attributes)?;

    Ok(Json(MessageResponse::updated(EntityKind::Account)))
}
