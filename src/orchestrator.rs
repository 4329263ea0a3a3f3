//! Creates records together with the join rows that make them complete.
//!
//! A new group, payee or account needs an ownership row for the creating
//! user. A new category needs its group link and a new transaction needs its
//! payee, category and account links. The primary record is inserted first
//! and the join rows are written by a [Saga], so a failed create leaves
//! nothing behind and can simply be retried.

use crate::{
    Error,
    auth::UserId,
    ownership::OwnershipChecker,
    record::{EntityKind, NewEntity, RecordId},
    saga::{Saga, Step, StoreOp},
    stores::{EntityStore, LinkTable, OwnershipTable},
};

/// Create `entity` on behalf of `owner` and return the ID of the new record.
///
/// References to existing records are ownership checked before anything is
/// written: a category may only be added to a group the user owns, and a
/// transaction may only use the user's own payee, category and account.
///
/// # Errors
/// - [Error::Unauthorized] if the user does not own a referenced record.
///   Nothing is written.
/// - [Error::Storage] if a write failed. Every write made before the failure
///   has been undone.
/// - [Error::CompensationFailure] if a write failed and undoing the earlier
///   writes failed too.
pub fn create(
    store: &dyn EntityStore,
    entity: &NewEntity,
    owner: &UserId,
) -> Result<RecordId, Error> {
    check_references(store, entity, owner)?;

    let kind = entity.kind();
    let id = store.insert_record(&entity.attributes()).map_err(|error| {
        tracing::error!("Could not insert new {kind}: {error}");
        Error::Storage(error)
    })?;

    tracing::debug!("Inserted {kind} {id}, adding its join rows");

    let saga = join_steps(entity, id, owner)
        .into_iter()
        .fold(Saga::new().after(StoreOp::DeleteRecord { kind, id }), Saga::then);

    saga.execute(store)?;

    tracing::info!("Created {kind} {id} for user {owner}");

    Ok(id)
}

fn check_references(
    store: &dyn EntityStore,
    entity: &NewEntity,
    owner: &UserId,
) -> Result<(), Error> {
    let checker = OwnershipChecker::new(store);

    match entity {
        NewEntity::Group { .. } | NewEntity::Payee { .. } | NewEntity::Account { .. } => Ok(()),
        NewEntity::Category { group_id, .. } => checker
            .check_direct(owner, OwnershipTable::Group, *group_id)
            .require(),
        NewEntity::Transaction {
            payee_id,
            category_id,
            account_id,
            ..
        } => {
            checker
                .check_direct(owner, OwnershipTable::Payee, *payee_id)
                .require()?;
            checker
                .check(owner, EntityKind::Category, *category_id)
                .require()?;
            checker
                .check_direct(owner, OwnershipTable::Account, *account_id)
                .require()
        }
    }
}

/// The join rows for the new record `id`, in the order they are written.
fn join_steps(entity: &NewEntity, id: RecordId, owner: &UserId) -> Vec<Step> {
    match entity {
        NewEntity::Group { .. } => vec![Step::ownership(OwnershipTable::Group, id, owner)],
        NewEntity::Payee { .. } => vec![Step::ownership(OwnershipTable::Payee, id, owner)],
        NewEntity::Account { .. } => vec![Step::ownership(OwnershipTable::Account, id, owner)],
        NewEntity::Category { group_id, .. } => {
            vec![Step::link(LinkTable::CategoryGroup, id, *group_id)]
        }
        NewEntity::Transaction {
            payee_id,
            category_id,
            account_id,
            ..
        } => vec![
            Step::link(LinkTable::TransactionPayee, id, *payee_id),
            Step::link(LinkTable::TransactionCategory, id, *category_id),
            Step::link(LinkTable::TransactionAccount, id, *account_id),
        ],
    }
}
