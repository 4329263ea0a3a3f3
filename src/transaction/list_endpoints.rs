//! Defines the endpoints for listing transactions.

use axum::{
    Json,
    extract::State,
};

use crate::{
    Error,
    auth::AuthenticatedUser,
    listing::{linked_records, records_linked_to_owned},
    ownership::OwnershipChecker,
    record::{EntityKind, Record, RecordId},
    stores::{LinkTable, OwnershipTable, StoreState},
    validation::ValidPath,
};

/// A route handler for listing the transactions on all of the caller's
/// accounts.
pub async fn get_transactions_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Record>>, Error> {
    records_linked_to_owned(
        state.store.as_ref(),
        LinkTable::TransactionAccount,
        OwnershipTable::Account,
        &user_id,
    )
    .map(Json)
}

/// A route handler for listing the transactions on one of the caller's
/// accounts.
pub async fn get_account_transactions_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidPath(account_id): ValidPath<RecordId>,
) -> Result<Json<Vec<Record>>, Error> {
    let store = state.store.as_ref();

    OwnershipChecker::new(store)
        .check_direct(&user_id, OwnershipTable::Account, account_id)
        .require()?;

    linked_records(store, LinkTable::TransactionAccount, &[account_id]).map(Json)
}

/// A route handler for listing the transactions in a category from one of
/// the caller's groups.
pub async fn get_category_transactions_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidPath(category_id): ValidPath<RecordId>,
) -> Result<Json<Vec<Record>>, Error> {
    let store = state.store.as_ref();

    OwnershipChecker::new(store)
        .check(&user_id, EntityKind::Category, category_id)
        .require()?;

    linked_records(store, LinkTable::TransactionCategory, &[category_id]).map(Json)
}
