#![allow(missing_docs)]

//! Test doubles and helpers shared by the unit tests.

pub(crate) mod http;

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use rusqlite::Connection;

use crate::{
    AppState,
    auth::{JwtIdentityResolver, UserId, issue_token},
    db::initialize,
    record::{Attributes, EntityKind, Record, RecordId},
    saga::StoreOp,
    stores::{EntityStore, LinkTable, OwnershipTable, RowsAffected, SQLiteStore, StoreError},
};

pub(crate) use http::{assert_message, build_test_server};

/// The secret used to sign bearer tokens in tests.
pub(crate) const TEST_SECRET: &str = "It's a secret to everybody.";

/// A store operation that [FaultyStore] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    InsertRecord(EntityKind),
    UpdateRecord(EntityKind),
    DeleteRecord(EntityKind),
    SelectRecords(EntityKind),
    InsertOwnership(OwnershipTable),
    DeleteOwnership(OwnershipTable),
    FindOwnership(OwnershipTable),
    OwnedIds(OwnershipTable),
    InsertLink(LinkTable),
    DeleteLink(LinkTable),
    RightIds(LinkTable),
    LeftIds(LinkTable),
}

#[derive(Debug)]
struct FaultRule {
    fault: Fault,
    /// How many more times to fail, `None` for always.
    remaining: Option<usize>,
}

/// An in-memory SQLite store that fails chosen operations on demand and
/// records every call it receives.
///
/// Injected failures never reach the database.
#[derive(Debug)]
pub(crate) struct FaultyStore {
    inner: SQLiteStore,
    connection: Arc<Mutex<Connection>>,
    rules: Mutex<Vec<FaultRule>>,
    calls: AtomicUsize,
    writes: Mutex<Vec<String>>,
}

impl FaultyStore {
    pub(crate) fn new() -> Self {
        let connection = Connection::open_in_memory().expect("could not open in-memory database");
        initialize(&connection).expect("could not initialize test database");
        let connection = Arc::new(Mutex::new(connection));

        Self {
            inner: SQLiteStore::new(connection.clone()),
            connection,
            rules: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call matching `fault`.
    pub(crate) fn fail_on(self, fault: Fault) -> Self {
        self.add_rule(fault, None);
        self
    }

    /// Fail the next call matching `fault`, then behave normally.
    pub(crate) fn fail_once_on(self, fault: Fault) -> Self {
        self.add_rule(fault, Some(1));
        self
    }

    /// Fail every call matching `fault` from now on, e.g. after test setup.
    pub(crate) fn start_failing(&self, fault: Fault) {
        self.add_rule(fault, None);
    }

    fn add_rule(&self, fault: Fault, remaining: Option<usize>) {
        self.rules
            .lock()
            .unwrap()
            .push(FaultRule { fault, remaining });
    }

    /// The number of store calls made, including failed ones and reads.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The writes that reached the database, in order.
    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Forget the calls and writes made so far, e.g. by test setup.
    pub(crate) fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.writes.lock().unwrap().clear();
    }

    pub(crate) fn connection(&self) -> &Mutex<Connection> {
        &self.connection
    }

    fn check(&self, fault: Fault) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut rules = self.rules.lock().unwrap();
        let Some(rule) = rules
            .iter_mut()
            .find(|rule| rule.fault == fault && rule.remaining != Some(0))
        else {
            return Ok(());
        };

        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
        }

        Err(StoreError::Constraint("injected failure".to_owned()))
    }

    fn log_write(&self, write: String) {
        self.writes.lock().unwrap().push(write);
    }
}

impl EntityStore for FaultyStore {
    fn insert_record(&self, attributes: &Attributes) -> Result<RecordId, StoreError> {
        self.check(Fault::InsertRecord(attributes.kind()))?;
        let id = self.inner.insert_record(attributes)?;
        self.log_write(format!("insert {} {id}", attributes.kind()));
        Ok(id)
    }

    fn update_record(
        &self,
        id: RecordId,
        attributes: &Attributes,
    ) -> Result<RowsAffected, StoreError> {
        self.check(Fault::UpdateRecord(attributes.kind()))?;
        self.log_write(format!("update {} {id}", attributes.kind()));
        self.inner.update_record(id, attributes)
    }

    fn delete_record(&self, kind: EntityKind, id: RecordId) -> Result<RowsAffected, StoreError> {
        self.check(Fault::DeleteRecord(kind))?;
        self.log_write(StoreOp::DeleteRecord { kind, id }.to_string());
        self.inner.delete_record(kind, id)
    }

    fn select_records(
        &self,
        kind: EntityKind,
        ids: &[RecordId],
    ) -> Result<Vec<Record>, StoreError> {
        self.check(Fault::SelectRecords(kind))?;
        self.inner.select_records(kind, ids)
    }

    fn insert_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        self.check(Fault::InsertOwnership(table))?;
        self.log_write(
            StoreOp::InsertOwnership {
                table,
                record_id,
                user_id: user_id.clone(),
            }
            .to_string(),
        );
        self.inner.insert_ownership(table, record_id, user_id)
    }

    fn delete_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<RowsAffected, StoreError> {
        self.check(Fault::DeleteOwnership(table))?;
        self.log_write(
            StoreOp::DeleteOwnership {
                table,
                record_id,
                user_id: user_id.clone(),
            }
            .to_string(),
        );
        self.inner.delete_ownership(table, record_id, user_id)
    }

    fn find_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<Vec<RecordId>, StoreError> {
        self.check(Fault::FindOwnership(table))?;
        self.inner.find_ownership(table, record_id, user_id)
    }

    fn owned_ids(
        &self,
        table: OwnershipTable,
        user_id: &UserId,
    ) -> Result<Vec<RecordId>, StoreError> {
        self.check(Fault::OwnedIds(table))?;
        self.inner.owned_ids(table, user_id)
    }

    fn insert_link(
        &self,
        table: LinkTable,
        left: RecordId,
        right: RecordId,
    ) -> Result<(), StoreError> {
        self.check(Fault::InsertLink(table))?;
        self.log_write(StoreOp::InsertLink { table, left, right }.to_string());
        self.inner.insert_link(table, left, right)
    }

    fn delete_link(
        &self,
        table: LinkTable,
        left: RecordId,
        right: RecordId,
    ) -> Result<RowsAffected, StoreError> {
        self.check(Fault::DeleteLink(table))?;
        self.log_write(StoreOp::DeleteLink { table, left, right }.to_string());
        self.inner.delete_link(table, left, right)
    }

    fn right_ids(&self, table: LinkTable, left: &[RecordId]) -> Result<Vec<RecordId>, StoreError> {
        self.check(Fault::RightIds(table))?;
        self.inner.right_ids(table, left)
    }

    fn left_ids(&self, table: LinkTable, right: &[RecordId]) -> Result<Vec<RecordId>, StoreError> {
        self.check(Fault::LeftIds(table))?;
        self.inner.left_ids(table, right)
    }
}

/// Count the rows in `table`, bypassing the store.
#[track_caller]
pub(crate) fn count_rows(store: &FaultyStore, table: &str) -> i64 {
    store
        .connection()
        .lock()
        .unwrap()
        .query_row(&format!(r#"SELECT COUNT(*) FROM "{table}""#), [], |row| {
            row.get(0)
        })
        .expect("could not count rows")
}

/// Build an [AppState] over `store` that accepts tokens from [token_for].
pub(crate) fn test_app_state(store: Arc<FaultyStore>) -> AppState {
    AppState::new(store, Arc::new(JwtIdentityResolver::new(TEST_SECRET, None)))
}

/// A bearer token for `user_id` signed with [TEST_SECRET].
pub(crate) fn token_for(user_id: &str) -> String {
    issue_token(
        TEST_SECRET,
        &UserId::new(user_id),
        None,
        time::Duration::minutes(15),
    )
    .expect("could not issue test token")
}

/// Insert a record owned by `user_id` without going through the orchestrator.
#[track_caller]
pub(crate) fn insert_owned(
    store: &FaultyStore,
    attributes: Attributes,
    user_id: &str,
) -> RecordId {
    let kind = attributes.kind();
    let table = OwnershipTable::for_kind(kind).expect("record kind is not owned directly");
    let id = store
        .insert_record(&attributes)
        .expect("could not insert test record");
    store
        .insert_ownership(table, id, &UserId::new(user_id))
        .expect("could not insert test ownership");

    id
}
