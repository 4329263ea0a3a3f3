//! Endpoints for creating, listing and renaming groups of categories.

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

/// The body of a request to create a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGroupRequest {
    /// The group name.
    pub name: String,
}

impl Validate for CreateGroupRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)
    }
}

/// The body of a request to rename a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateGroupRequest {
    /// The group to rename.
    pub group_id: RecordId,
    /// The new name.
    pub name: String,
}

impl Validate for UpdateGroupRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)
    }
}

/// A route handler for creating a group owned by the caller.
pub async fn create_group_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<CreateGroupRequest>,
) -> Result<Json<CreatedResponse>, Error> {
    let new_group = NewEntity::Group { name: request.name };
    let group_id = orchestrator::create(state.store.as_ref(), &new_group, &user_id)?;

    Ok(Json(CreatedResponse::new(EntityKind::Group, group_id)))
}

/// A route handler for listing the caller's groups.
pub async fn get_groups_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Record>>, Error> {
    owned_records(state.store.as_ref(), OwnershipTable::Group, &user_id).map(Json)
}

/// A route handler for renaming one of the caller's groups.
pub async fn update_group_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<UpdateGroupRequest>,
) -> Result<Json<MessageResponse>, Error> {
    update_guard::update(
        state.store.as_ref(),
        request.group_id,
        &user_id,
        &Attributes::Group { name: request.name },
    )?;

    Ok(Json(MessageResponse::updated(EntityKind::Group)))
}
