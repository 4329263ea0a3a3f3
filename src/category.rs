//! Endpoints for budget categories.
//!
//! A category always belongs to exactly one group and is owned by whoever
//! owns that group.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::AuthenticatedUser,
    listing::{linked_records, records_linked_to_owned},
    orchestrator,
    ownership::OwnershipChecker,
    record::{Attributes, EntityKind, NewEntity, Record, RecordId},
    response::{CreatedResponse, MessageResponse},
    stores::{LinkTable, OwnershipTable, StoreState},
    update_guard,
    validation::{ValidJson, ValidPath, Validate, validate_name},
};

/// The body of a request to create a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    /// The category name.
    pub name: String,
    /// The group to add the category to. Must be owned by the caller.
    pub group_id: RecordId,
}

impl Validate for CreateCategoryRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)
    }
}

/// The body of a request to rename a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    /// The category to rename.
    pub category_id: RecordId,
    /// The new name.
    pub name: String,
}

impl Validate for UpdateCategoryRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_name("name", &self.name)
    }
}

/// A route handler for creating a category in one of the caller's groups.
pub async fn create_category_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<CreateCategoryRequest>,
) -> Result<Json<CreatedResponse>, Error> {
    let new_category = NewEntity::Category {
        name: request.name,
        group_id: request.group_id,
    };
    let category_id = orchestrator::create(state.store.as_ref(), &new_category, &user_id)?;

    Ok(Json(CreatedResponse::new(EntityKind::Category, category_id)))
}

/// A route handler for listing the categories in all of the caller's groups.
pub async fn get_categories_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Record>>, Error> {
    records_linked_to_owned(
        state.store.as_ref(),
        LinkTable::CategoryGroup,
        OwnershipTable::Group,
        &user_id,
    )
    .map(Json)
}

/// A route handler for listing the categories in one of the caller's groups.
pub async fn get_group_categories_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidPath(group_id): ValidPath<RecordId>,
) -> Result<Json<Vec<Record>>, Error> {
    let store = state.store.as_ref();

    OwnershipChecker::new(store)
        .check_direct(&user_id, OwnershipTable::Group, group_id)
        .require()?;

    linked_records(store, LinkTable::CategoryGroup, &[group_id]).map(Json)
}

/// A route handler for renaming a category in one of the caller's groups.
pub async fn update_category_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<UpdateCategoryRequest>,
) -> Result<Json<MessageResponse>, Error> {
    update_guard::update(
        state.store.as_ref(),
        request.category_id,
        &user_id,
        &Attributes::Category { name: request.name },
    )?;

    Ok(Json(MessageResponse::updated(EntityKind::Category)))
}
