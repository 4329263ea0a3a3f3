//! Decides whether a user owns a record.
//!
//! Groups, payees and accounts are owned through their ownership join
//! tables. Categories are owned through the group they are linked to and
//! transactions through the account they are linked to.
//!
//! Every check fails closed: a missing row, an ambiguous link and a store
//! error all deny access.

use crate::{
    Error,
    auth::UserId,
    record::{EntityKind, RecordId},
    stores::{EntityStore, LinkTable, OwnershipTable},
};

/// The outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The user owns the record and may read or modify it.
    Authorized,
    /// The user does not own the record, or ownership could not be
    /// confirmed.
    Unauthorized,
}

impl Capability {
    /// Convert a denial into [Error::Unauthorized].
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] unless access was granted.
    pub fn require(self) -> Result<(), Error> {
        match self {
            Capability::Authorized => Ok(()),
            Capability::Unauthorized => Err(Error::Unauthorized),
        }
    }
}

/// Checks ownership against the join tables of a store.
pub struct OwnershipChecker<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> OwnershipChecker<'a> {
    /// Create a checker that reads from `store`.
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Check for a row in `table` matching both `record_id` and `user_id`.
    pub fn check_direct(
        &self,
        user_id: &UserId,
        table: OwnershipTable,
        record_id: RecordId,
    ) -> Capability {
        match self.store.find_ownership(table, record_id, user_id) {
            Ok(rows) if !rows.is_empty() => Capability::Authorized,
            Ok(_) => {
                tracing::warn!("User {user_id} does not own {} {record_id}", table.kind());
                Capability::Unauthorized
            }
            Err(error) => {
                tracing::warn!(
                    "Could not check ownership of {} {record_id} for user {user_id}, denying access: {error}",
                    table.kind()
                );
                Capability::Unauthorized
            }
        }
    }

    /// Check whether `user_id` owns the record of `kind` with `record_id`,
    /// following the link to the owning record for categories and
    /// transactions.
    pub fn check(&self, user_id: &UserId, kind: EntityKind, record_id: RecordId) -> Capability {
        match kind {
            EntityKind::Group => self.check_direct(user_id, OwnershipTable::Group, record_id),
            EntityKind::Payee => self.check_direct(user_id, OwnershipTable::Payee, record_id),
            EntityKind::Account => self.check_direct(user_id, OwnershipTable::Account, record_id),
            EntityKind::Category => self.check_linked(
                user_id,
                LinkTable::CategoryGroup,
                OwnershipTable::Group,
                record_id,
            ),
            EntityKind::Transaction => self.check_linked(
                user_id,
                LinkTable::TransactionAccount,
                OwnershipTable::Account,
                record_id,
            ),
        }
    }

    fn check_linked(
        &self,
        user_id: &UserId,
        link: LinkTable,
        owner_table: OwnershipTable,
        record_id: RecordId,
    ) -> Capability {
        let owner_ids = match self.store.right_ids(link, &[record_id]) {
            Ok(owner_ids) => owner_ids,
            Err(error) => {
                tracing::warn!(
                    "Could not find the {} of {} {record_id}, denying access: {error}",
                    link.right(),
                    link.left()
                );
                return Capability::Unauthorized;
            }
        };

        match owner_ids.as_slice() {
            [owner_id] => self.check_direct(user_id, owner_table, *owner_id),
            [] => {
                tracing::warn!("{} {record_id} is not linked to any {}", link.left(), link.right());
                Capability::Unauthorized
            }
            _ => {
                tracing::warn!(
                    "{} {record_id} is linked to {} {}s, denying access",
                    link.left(),
                    owner_ids.len(),
                    link.right()
                );
                Capability::Unauthorized
            }
        }
    }
}
