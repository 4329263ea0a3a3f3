//! Implements a SQLite backed entity store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, params, params_from_iter};

use crate::{
    auth::UserId,
    db::MapRow,
    record::{
        Account, Attributes, Category, EntityKind, Group, Payee, Record, RecordId, Transaction,
    },
    stores::{EntityStore, LinkTable, OwnershipTable, RowsAffected, StoreError},
};

/// Stores records in a SQLite database.
///
/// The connection is shared behind a mutex. Each method takes the lock once
/// and releases it before returning, so the calls of concurrent requests
/// interleave. Long ID lists are split into batches of at most
/// `MAX_PARAMETERS` IDs per statement.
#[derive(Debug, Clone)]
pub struct SQLiteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteStore {
    /// Create a new store over an initialized database connection.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            StoreError::LockPoisoned
        })
    }
}

/// The most IDs bound to a single statement. SQLite builds before 3.32 cap a
/// statement at 999 parameters, newer ones at 32766.
const MAX_PARAMETERS: usize = 999;

/// Build a list of `count` positional SQL parameters, e.g. "?, ?, ?".
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Run `query` once per batch of `ids` and return the distinct IDs found, in
/// ascending order.
///
/// `query` takes the batch size and returns SQL with that many parameters.
fn collect_ids(
    connection: &Connection,
    query: impl Fn(usize) -> String,
    ids: &[RecordId],
) -> Result<Vec<RecordId>, StoreError> {
    let mut found = Vec::new();

    for batch in ids.chunks(MAX_PARAMETERS) {
        let batch_ids = connection
            .prepare(&query(batch.len()))?
            .query_map(params_from_iter(batch), |row| row.get(0))?
            .collect::<Result<Vec<RecordId>, _>>()?;
        found.extend(batch_ids);
    }

    found.sort_unstable();
    found.dedup();

    Ok(found)
}

fn collect_records<T>(
    connection: &Connection,
    query: impl Fn(usize) -> String,
    ids: &[RecordId],
    wrap: fn(T) -> Record,
) -> Result<Vec<Record>, StoreError>
where
    T: MapRow<ReturnType = T>,
{
    let mut records = Vec::new();

    for batch in ids.chunks(MAX_PARAMETERS) {
        let batch_records = connection
            .prepare(&query(batch.len()))?
            .query_map(params_from_iter(batch), T::map_row)?
            .collect::<Result<Vec<T>, _>>()?;
        records.extend(batch_records.into_iter().map(wrap));
    }

    records.sort_by_key(Record::id);
    records.dedup_by_key(|record| record.id());

    Ok(records)
}

impl EntityStore for SQLiteStore {
    fn insert_record(&self, attributes: &Attributes) -> Result<RecordId, StoreError> {
        let connection = self.lock()?;

        match attributes {
            Attributes::Group { name } => {
                connection.execute(r#"INSERT INTO "groups" (name) VALUES (?1)"#, (name,))?
            }
            Attributes::Payee { name } => {
                connection.execute("INSERT INTO payees (name) VALUES (?1)", (name,))?
            }
            Attributes::Account { name, balance } => connection.execute(
                "INSERT INTO accounts (name, balance) VALUES (?1, ?2)",
                params![name, balance],
            )?,
            Attributes::Category { name } => {
                connection.execute("INSERT INTO categories (name) VALUES (?1)", (name,))?
            }
            Attributes::Transaction { amount, date } => connection.execute(
                "INSERT INTO transactions (amount, transaction_date) VALUES (?1, ?2)",
                params![amount, date],
            )?,
        };

        Ok(connection.last_insert_rowid())
    }

    fn update_record(
        &self,
        id: RecordId,
        attributes: &Attributes,
    ) -> Result<RowsAffected, StoreError> {
        let connection = self.lock()?;

        let rows_affected = match attributes {
            Attributes::Group { name } => connection.execute(
                r#"UPDATE "groups" SET name = ?1 WHERE group_id = ?2"#,
                params![name, id],
            )?,
            Attributes::Payee { name } => connection.execute(
                "UPDATE payees SET name = ?1 WHERE payee_id = ?2",
                params![name, id],
            )?,
            Attributes::Account { name, balance } => connection.execute(
                "UPDATE accounts SET name = ?1, balance = ?2 WHERE account_id = ?3",
                params![name, balance, id],
            )?,
            Attributes::Category { name } => connection.execute(
                "UPDATE categories SET name = ?1 WHERE category_id = ?2",
                params![name, id],
            )?,
            Attributes::Transaction { amount, date } => connection.execute(
                "UPDATE transactions SET amount = ?1, transaction_date = ?2 \
                WHERE transaction_id = ?3",
                params![amount, date, id],
            )?,
        };

        Ok(rows_affected)
    }

    fn delete_record(&self, kind: EntityKind, id: RecordId) -> Result<RowsAffected, StoreError> {
        let query = format!(
            r#"DELETE FROM "{}" WHERE {} = ?1"#,
            kind.table(),
            kind.id_column()
        );

        self.lock()?
            .execute(&query, (id,))
            .map_err(StoreError::from)
    }

    fn select_records(
        &self,
        kind: EntityKind,
        ids: &[RecordId],
    ) -> Result<Vec<Record>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let columns = match kind {
            EntityKind::Group => "group_id, name",
            EntityKind::Payee => "payee_id, name",
            EntityKind::Account => "account_id, name, balance",
            EntityKind::Category => "category_id, name",
            EntityKind::Transaction => "transaction_id, amount, transaction_date",
        };
        let query = |count| {
            format!(
                r#"SELECT {columns} FROM "{}" WHERE {id} IN ({}) ORDER BY {id}"#,
                kind.table(),
                placeholders(count),
                id = kind.id_column(),
            )
        };
        let connection = self.lock()?;

        match kind {
            EntityKind::Group => collect_records::<Group>(&connection, query, ids, Record::Group),
            EntityKind::Payee => collect_records::<Payee>(&connection, query, ids, Record::Payee),
            EntityKind::Account => {
                collect_records::<Account>(&connection, query, ids, Record::Account)
            }
            EntityKind::Category => {
                collect_records::<Category>(&connection, query, ids, Record::Category)
            }
            EntityKind::Transaction => {
                collect_records::<Transaction>(&connection, query, ids, Record::Transaction)
            }
        }
    }

    fn insert_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        let query = format!(
            "INSERT INTO {} ({}, user_id) VALUES (?1, ?2)",
            table.table(),
            table.record_column()
        );

        self.lock()?
            .execute(&query, params![record_id, user_id.as_str()])?;

        Ok(())
    }

    fn delete_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<RowsAffected, StoreError> {
        let query = format!(
            "DELETE FROM {} WHERE {} = ?1 AND user_id = ?2",
            table.table(),
            table.record_column()
        );

        self.lock()?
            .execute(&query, params![record_id, user_id.as_str()])
            .map_err(StoreError::from)
    }

    fn find_ownership(
        &self,
        table: OwnershipTable,
        record_id: RecordId,
        user_id: &UserId,
    ) -> Result<Vec<RecordId>, StoreError> {
        let query = format!(
            "SELECT {column} FROM {} WHERE {column} = ?1 AND user_id = ?2",
            table.table(),
            column = table.record_column()
        );

        self.lock()?
            .prepare(&query)?
            .query_map(params![record_id, user_id.as_str()], |row| row.get(0))?
            .map(|maybe_id| maybe_id.map_err(StoreError::from))
            .collect()
    }

    fn owned_ids(
        &self,
        table: OwnershipTable,
        user_id: &UserId,
    ) -> Result<Vec<RecordId>, StoreError> {
        let query = format!(
            "SELECT {column} FROM {} WHERE user_id = ?1 ORDER BY {column}",
            table.table(),
            column = table.record_column()
        );

        self.lock()?
            .prepare(&query)?
            .query_map((user_id.as_str(),), |row| row.get(0))?
            .map(|maybe_id| maybe_id.map_err(StoreError::from))
            .collect()
    }

    fn insert_link(
        &self,
        table: LinkTable,
        left: RecordId,
        right: RecordId,
    ) -> Result<(), StoreError> {
        let query = format!(
            "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
            table.table(),
            table.left().id_column(),
            table.right().id_column()
        );

        self.lock()?.execute(&query, params![left, right])?;

        Ok(())
    }

    fn delete_link(
        &self,
        table: LinkTable,
        left: RecordId,
        right: RecordId,
    ) -> Result<RowsAffected, StoreError> {
        let query = format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
            table.table(),
            table.left().id_column(),
            table.right().id_column()
        );

        self.lock()?
            .execute(&query, params![left, right])
            .map_err(StoreError::from)
    }

    fn right_ids(&self, table: LinkTable, left: &[RecordId]) -> Result<Vec<RecordId>, StoreError> {
        if left.is_empty() {
            return Ok(Vec::new());
        }

        let query = |count| {
            format!(
                "SELECT DISTINCT {right} FROM {} WHERE {} IN ({}) ORDER BY {right}",
                table.table(),
                table.left().id_column(),
                placeholders(count),
                right = table.right().id_column(),
            )
        };
        let connection = self.lock()?;

        collect_ids(&connection, query, left)
    }

    fn left_ids(&self, table: LinkTable, right: &[RecordId]) -> Result<Vec<RecordId>, StoreError> {
        if right.is_empty() {
            return Ok(Vec::new());
        }

        let query = |count| {
            format!(
                "SELECT DISTINCT {left} FROM {} WHERE {} IN ({}) ORDER BY {left}",
                table.table(),
                table.right().id_column(),
                placeholders(count),
                left = table.left().id_column(),
            )
        };
        let connection = self.lock()?;

        collect_ids(&connection, query, right)
    }
}
