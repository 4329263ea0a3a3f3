/*! Creates the application's database schema and maps rows to records. */

use rusqlite::{Connection, Error, Row};

use crate::record::{Account, Category, Group, Payee, Transaction};

/// Create the record and join tables if they do not exist yet and turn on
/// foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an error if any of the SQL statements fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS "groups" (
            group_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS payees (
            payee_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS accounts (
            account_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            balance REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            category_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transactions (
            transaction_id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            transaction_date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS group_user_join (
            group_id INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            PRIMARY KEY (group_id, user_id),
            FOREIGN KEY(group_id) REFERENCES "groups"(group_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS payee_user_join (
            payee_id INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            PRIMARY KEY (payee_id, user_id),
            FOREIGN KEY(payee_id) REFERENCES payees(payee_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS account_user_join (
            account_id INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            PRIMARY KEY (account_id, user_id),
            FOREIGN KEY(account_id) REFERENCES accounts(account_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS group_user_join_user ON group_user_join(user_id);
        CREATE INDEX IF NOT EXISTS payee_user_join_user ON payee_user_join(user_id);
        CREATE INDEX IF NOT EXISTS account_user_join_user ON account_user_join(user_id);

        CREATE TABLE IF NOT EXISTS category_group_join (
            category_id INTEGER NOT NULL,
            group_id INTEGER NOT NULL,
            PRIMARY KEY (category_id, group_id),
            FOREIGN KEY(category_id) REFERENCES categories(category_id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(group_id) REFERENCES "groups"(group_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS transaction_payee_join (
            transaction_id INTEGER NOT NULL,
            payee_id INTEGER NOT NULL,
            PRIMARY KEY (transaction_id, payee_id),
            FOREIGN KEY(transaction_id) REFERENCES transactions(transaction_id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(payee_id) REFERENCES payees(payee_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS transaction_category_join (
            transaction_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY (transaction_id, category_id),
            FOREIGN KEY(transaction_id) REFERENCES transactions(transaction_id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES categories(category_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS transaction_account_join (
            transaction_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            PRIMARY KEY (transaction_id, account_id),
            FOREIGN KEY(transaction_id) REFERENCES transactions(transaction_id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(account_id) REFERENCES accounts(account_id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS category_group_join_group ON category_group_join(group_id);
        CREATE INDEX IF NOT EXISTS transaction_category_join_category ON transaction_category_join(category_id);
        CREATE INDEX IF NOT EXISTS transaction_account_join_account ON transaction_account_join(account_id);
        "#,
    )
}

/// A trait for mapping from a `rusqlite::Row` to a concrete rust type.
pub trait MapRow {
    /// The type produced from the row.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error>;
}

impl MapRow for Group {
    type ReturnType = Self;

    fn map_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            group_id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl MapRow for Payee {
    type ReturnType = Self;

    fn map_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            payee_id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl MapRow for Account {
    type ReturnType = Self;

    fn map_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            account_id: row.get(0)?,
            name: row.get(1)?,
            balance: row.get(2)?,
        })
    }
}

impl MapRow for Category {
    type ReturnType = Self;

    fn map_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            category_id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl MapRow for Transaction {
    type ReturnType = Self;

    fn map_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            transaction_id: row.get(0)?,
            amount: row.get(1)?,
            transaction_date: row.get(2)?,
        })
    }
}
