//! Endpoints for the people and businesses transactions are paid to.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::AuthenticatedUser,
    listing::owned_records,
    orchestrator,
    record::{Attributes, EntityKind, NewEntity, Record, RecordId},
    response::{CreatedResponse, MessageResponse},
    stores::{OwnershipTable, StoreState},
    update_guard,
    validation::{ValidJson, Validate, validate_name},
};

/// The body of a request to create a payee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePayeeRequest {
    /// The payee name.
    pub name: String,
}

impl Validate for CreatePayeeRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)
    }
}

/// The body of a request to rename a payee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePayeeRequest {
    /// The payee to rename.
    pub payee_id: RecordId,
    /// The new name.
    pub name: String,
}

impl Validate for UpdatePayeeRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)
    }
}

/// A route handler for creating a payee owned by the caller.
pub async fn create_payee_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<CreatePayeeRequest>,
) -> Result<Json<CreatedResponse>, Error> {
    let new_payee = NewEntity::Payee { name: request.name };
    let payee_id = orchestrator::create(state.store.as_ref(), &new_payee, &user_id)?;

    Ok(Json(CreatedResponse::new(EntityKind::Payee, payee_id)))
}

/// A route handler for listing the caller's payees.
pub async fn get_payees_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Record>>, Error> {
    owned_records(state.store.as_ref(), OwnershipTable::Payee, &user_id).map(Json)
}

/// A route handler for renaming one of the caller's payees.
pub async fn update_payee_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<UpdatePayeeRequest>,
) -> Result<Json<MessageResponse>, Error> {
    update_guard::update(
        state.store.as_ref(),
        request.payee_id,
        &user_id,
        &Attributes::Payee { name: request.name },
    )?;

    Ok(Json(MessageResponse::updated(EntityKind::Payee)))
}
