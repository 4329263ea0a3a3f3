//! Application-level atomicity for writes that span several tables.
//!
//! The store has no cross-statement transactions, so a multi-table write is
//! expressed as a [Saga]: an ordered list of [Step]s, each pairing a forward
//! write with the write that undoes it. Steps run one at a time. When a
//! forward write fails, the compensations of every step that already
//! succeeded run in reverse order before the failure is reported.

use std::fmt::Display;

use crate::{
    Error,
    auth::UserId,
    record::{EntityKind, RecordId},
    stores::{EntityStore, LinkTable, OwnershipTable, StoreError},
};

/// A single write against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    /// Delete a primary record.
    DeleteRecord {
        /// The kind of record.
        kind: EntityKind,
        /// The ID of the record.
        id: RecordId,
    },
    /// Insert an ownership row.
    InsertOwnership {
        /// The ownership table.
        table: OwnershipTable,
        /// The owned record.
        record_id: RecordId,
        /// The owner.
        user_id: UserId,
    },
    /// Delete an ownership row.
    DeleteOwnership {
        /// The ownership table.
        table: OwnershipTable,
        /// The owned record.
        record_id: RecordId,
        /// The owner.
        user_id: UserId,
    },
    /// Insert a link between two records.
    InsertLink {
        /// The link table.
        table: LinkTable,
        /// The dependent record.
        left: RecordId,
        /// The record linked to.
        right: RecordId,
    },
    /// Delete a link between two records.
    DeleteLink {
        /// The link table.
        table: LinkTable,
        /// The dependent record.
        left: RecordId,
        /// The record linked to.
        right: RecordId,
    },
}

impl StoreOp {
    /// Execute the write against `store`.
    ///
    /// Deletes that match no rows count as success: the state they were
    /// meant to produce already holds.
    ///
    /// # Errors
    /// Returns the store's error unchanged.
    pub fn apply(&self, store: &dyn EntityStore) -> Result<(), StoreError> {
        match self {
            StoreOp::DeleteRecord { kind, id } => store.delete_record(*kind, *id).map(|_| ()),
            StoreOp::InsertOwnership {
                table,
                record_id,
                user_id,
            } => store.insert_ownership(*table, *record_id, user_id),
            StoreOp::DeleteOwnership {
                table,
                record_id,
                user_id,
            } => store
                .delete_ownership(*table, *record_id, user_id)
                .map(|_| ()),
            StoreOp::InsertLink { table, left, right } => store.insert_link(*table, *left, *right),
            StoreOp::DeleteLink { table, left, right } => {
                store.delete_link(*table, *left, *right).map(|_| ())
            }
        }
    }
}

impl Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOp::DeleteRecord { kind, id } => write!(f, "delete {kind} {id}"),
            StoreOp::InsertOwnership {
                table,
                record_id,
                user_id,
            } => write!(f, "insert ({record_id}, {user_id}) into {table}"),
            StoreOp::DeleteOwnership {
                table,
                record_id,
                user_id,
            } => write!(f, "delete ({record_id}, {user_id}) from {table}"),
            StoreOp::InsertLink { table, left, right } => {
                write!(f, "insert ({left}, {right}) into {table}")
            }
            StoreOp::DeleteLink { table, left, right } => {
                write!(f, "delete ({left}, {right}) from {table}")
            }
        }
    }
}

/// A forward write paired with the write that undoes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The write to perform.
    pub forward: StoreOp,
    /// The write that reverts `forward` once it has succeeded.
    pub compensate: StoreOp,
}

impl Step {
    /// Create a step from a forward write and its compensation.
    pub fn new(forward: StoreOp, compensate: StoreOp) -> Self {
        Self {
            forward,
            compensate,
        }
    }

    /// A step that makes `user_id` the owner of `record_id`.
    pub fn ownership(table: OwnershipTable, record_id: RecordId, user_id: &UserId) -> Self {
        Self::new(
            StoreOp::InsertOwnership {
                table,
                record_id,
                user_id: user_id.clone(),
            },
            StoreOp::DeleteOwnership {
                table,
                record_id,
                user_id: user_id.clone(),
            },
        )
    }

    /// A step that links the record `left` to the record `right`.
    pub fn link(table: LinkTable, left: RecordId, right: RecordId) -> Self {
        Self::new(
            StoreOp::InsertLink { table, left, right },
            StoreOp::DeleteLink { table, left, right },
        )
    }
}

/// An ordered list of steps that either all take effect or are all undone.
#[derive(Debug, Default)]
pub struct Saga {
    steps: Vec<Step>,
    completed: Vec<StoreOp>,
}

impl Saga {
    /// Create an empty saga.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the compensation for a write that already happened before
    /// the saga started, e.g. the insert that produced the record ID the
    /// steps refer to.
    ///
    /// It is undone last if any step fails.
    pub fn after(mut self, compensate: StoreOp) -> Self {
        self.completed.push(compensate);
        self
    }

    /// Append a step to run after the steps already added.
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Run every step in order.
    ///
    /// # Errors
    /// If a forward write fails, every completed step is compensated in
    /// reverse order and [Error::Storage] is returned with the forward
    /// error. If any compensation fails too, the remaining compensations are
    /// still attempted and [Error::CompensationFailure] is returned, listing
    /// the writes that could not be undone.
    pub fn execute(self, store: &dyn EntityStore) -> Result<(), Error> {
        let Saga {
            steps,
            mut completed,
        } = self;

        for step in steps {
            tracing::debug!("saga step: {}", step.forward);

            match step.forward.apply(store) {
                Ok(()) => completed.push(step.compensate),
                Err(error) => {
                    tracing::error!("saga step \"{}\" failed: {error}", step.forward);
                    return Err(compensate(store, completed, error));
                }
            }
        }

        Ok(())
    }
}

fn compensate(store: &dyn EntityStore, completed: Vec<StoreOp>, cause: StoreError) -> Error {
    let mut uncompensated = Vec::new();

    for compensation in completed.into_iter().rev() {
        tracing::debug!("compensating: {compensation}");

        if let Err(error) = compensation.apply(store) {
            tracing::error!(
                "compensation \"{compensation}\" failed, orphaned data remains: {error}"
            );
            uncompensated.push(compensation);
        }
    }

    if uncompensated.is_empty() {
        Error::Storage(cause)
    } else {
        Error::CompensationFailure {
            cause,
            uncompensated,
        }
    }
}
