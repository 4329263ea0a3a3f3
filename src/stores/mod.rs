//! The entity store: single-statement primitives over the record and join
//! tables.
//!
//! Every method on [EntityStore] issues exactly one SQL statement. The store
//! offers no atomicity across calls, so callers that need several writes to
//! succeed or fail together must use the [saga](crate::saga) machinery.

pub mod sqlite;

use std::{fmt::Display, sync::Arc};

use axum::extract::FromRef;

use crate::{
    AppState,
    auth::UserId,
    record::{Attributes, EntityKind, Record, RecordId},
};

pub use sqlite::SQLiteStore;

/// The number of rows changed by an update or delete.
pub type RowsAffected = usize;

/// Errors originating from a single store operation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    /// The lock guarding the database connection was poisoned by a panic in
    /// another thread.
    #[error("could not acquire the database lock")]
    LockPoisoned,

    /// A foreign key or uniqueness constraint rejected the statement.
    #[error("a database constraint was violated: {0}")]
    Constraint(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            // 787: FOREIGN KEY, 1555: PRIMARY KEY, 2067: UNIQUE.
            rusqlite::Error::SqliteFailure(sql_error, description)
                if matches!(sql_error.extended_code, 787 | 1555 | 2067) =>
            {
                StoreError::Constraint(description.unwrap_or_else(|| sql_error.to_string()))
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                StoreError::Sql(error)
            }
        }
    }
}

/// The join tables that record which user owns a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipTable {
    /// `group_user_join`
    Group,
    /// `payee_user_join`
    Payee,
    /// `account_user_join`
    Account,
}

impl OwnershipTable {
    /// The ownership table for records of `kind`, if that kind is owned
    /// directly by users.
    pub fn for_kind(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::Group => Some(OwnershipTable::Group),
            EntityKind::Payee => Some(OwnershipTable::Payee),
            EntityKind::Account => Some(OwnershipTable::Account),
            EntityKind::Category | EntityKind::Transaction => None,
        }
    }

    /// The kind of record this table assigns owners to.
    pub fn kind(&self) -> EntityKind {
        match self {
            OwnershipTable::Group => EntityKind::Group,
            OwnershipTable::Payee => EntityKind::Payee,
            OwnershipTable::Account => EntityKind::Account,
        }
    }

    /// The table name.
    pub fn table(&self) -> &'static str {
        match self {
            OwnershipTable::Group => "group_user_join",
            OwnershipTable::Payee => "payee_user_join",
            OwnershipTable::Account => "account_user_join",
        }
    }

    /// The column holding the owned record's ID.
    pub fn record_column(&self) -> &'static str {
        self.kind().id_column()
    }
}

impl Display for OwnershipTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// The join tables that link one primary record to another.
///
/// Each link has a "left" record (the one that depends on the link to be
/// complete) and a "right" record it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkTable {
    /// `category_group_join`: category → group.
    CategoryGroup,
    /// `transaction_payee_join`: transaction → payee.
    TransactionPayee,
    /// `transaction_category_join`: transaction → category.
    TransactionCategory,
    /// `transaction_account_join`: transaction → account.
    TransactionAccount,
}

impl LinkTable {
    /// The table name.
    pub fn table(&self) -> &'static str {
        match self {
            LinkTable::CategoryGroup => "category_group_join",
            LinkTable::TransactionPayee => "transaction_payee_join",
            LinkTable::TransactionCategory => "transaction_category_join",
            LinkTable::TransactionAccount => "transaction_account_join",
        }
    }

    /// The kind of the left record.
    pub fn left(&self) -> EntityKind {
        match self {
            LinkTable::CategoryGroup => EntityKind::Category,
            LinkTable::TransactionPayee
            | LinkTable::TransactionCategory
            | LinkTable::TransactionAccount => EntityKind::Transaction,
        }
    }

    /// The kind of the right record.
    pub fn right(&self) -> EntityKind {
        match self {
            LinkTable::CategoryGroup => EntityKind::Group,
            LinkTable::TransactionPayee => EntityKind::Payee,
            LinkTable::TransactionCategory => EntityKind::Category,
            LinkTable::TransactionAccount => EntityKind::Account,
        }
    }
}

impl Display for LinkTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Single-table insert, select, update and delete primitives.
pub trait EntityStore: Send + Sync {
    /// Insert a primary record and return its generated ID.
    fn insert_record(&self, attributes: &Attributes) -> Result<RecordId, StoreError>;

    /// Overwrite the attributes of the record with `id` in the table for
    /// `attributes.kind()`.
    fn update_record(
        &self,
        id: RecordId,
        attributes: &Attributes,
    ) -> Result<RowsAffected, StoreError>;

    /// Delete the record of `kind` with `id`.
    fn delete_record(&self, kind: EntityKind, id: RecordId) -> Result<RowsAffected, StoreError>;

    /// Get the records of `kind` whose IDs are in `ids`, ordered by ID.
    fn select_records(&self, kind: EntityKind, ids: &[RecordId]) -> Result<Vec<Record>, StoreError>;

    /// Record that `user_id` owns `record_id`.
    fn insert_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<(), StoreError>;

    /// Remove the ownership row for (`record_id`, `user_id`).
    fn delete_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<RowsAffected, StoreError>;

    /// Find the ownership rows matching both `record_id` and `user_id`.
    ///
    /// Returns the matching record IDs, which is empty when the user does
    /// not own the record.
    fn find_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<Vec<RecordId>, StoreError>;

    /// Get the IDs of every record in `table` owned by `user_id`.
    fn owned_ids(&self, table: OwnershipTable, user_id: &UserId)
    -> Result<Vec<RecordId>, StoreError>;

    /// Link the record `left` to the record `right`.
    fn insert_link(&self, table: LinkTable, left: RecordId, right: RecordId)
    -> Result<(), StoreError>;

    /// Remove the link between `left` and `right`.
    fn delete_link(
        &self,
        table: LinkTable,
        left: RecordId,
        right: RecordId,
    ) -> Result<RowsAffected, StoreError>;

    /// Get the IDs of the right records linked from any of the `left` records.
    fn right_ids(&self, table: LinkTable, left: &[RecordId]) -> Result<Vec<RecordId>, StoreError>;

    /// Get the IDs of the left records linked to any of the `right` records.
    fn left_ids(&self, table: LinkTable, right: &[RecordId]) -> Result<Vec<RecordId>, StoreError>;
}

/// The state needed by endpoints that read or write records.
#[derive(Clone)]
pub struct StoreState {
    /// The store holding the budget records.
    pub store: Arc<dyn EntityStore>,
}

impl FromRef<AppState> for StoreState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}
