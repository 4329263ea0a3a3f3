//! Read-only queries that list the records a user can see.
//!
//! Each listing reads one join table and then the primary table. The store
//! splits long ID lists across statements.

use crate::{
    Error,
    auth::UserId,
    record::{Record, RecordId},
    stores::{EntityStore, LinkTable, OwnershipTable},
};

/// Get every record in `table` owned by `user_id`, ordered by ID.
///
/// # Errors
/// Returns [Error::Storage] if either read fails.
pub fn owned_records(
    store: &dyn EntityStore,
    table: OwnershipTable,
    user_id: &UserId,
) -> Result<Vec<Record>, Error> {
    let ids = store.owned_ids(table, user_id)?;

    Ok(store.select_records(table.kind(), &ids)?)
}

/// Get the left records of `link` that point at any of `right_ids`, ordered
/// by ID.
///
/// For example, the categories in a set of groups or the transactions on a
/// set of accounts.
///
/// # Errors
/// Returns [Error::Storage] if either read fails.
pub fn linked_records(
    store: &dyn EntityStore,
    link: LinkTable,
    right_ids: &[RecordId],
) -> Result<Vec<Record>, Error> {
    let ids = store.left_ids(link, right_ids)?;

    Ok(store.select_records(link.left(), &ids)?)
}

/// Get the left records of `link` pointing at any record in
/// `owner_table` owned by `user_id`.
///
/// # Errors
/// Returns [Error::Storage] if any read fails.
pub fn records_linked_to_owned(
    store: &dyn EntityStore,
    link: LinkTable,
    owner_table: OwnershipTable,
    user_id: &UserId,
) -> Result<Vec<Record>, Error> {
    let owned_ids = store.owned_ids(owner_table, user_id)?;

    linked_records(store, link, &owned_ids)
}
