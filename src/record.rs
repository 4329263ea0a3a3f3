//! The primary records of the budget: groups, payees, accounts, categories
//! and transactions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::Date;

/// Alias for the integer type used for store-generated record IDs.
pub type RecordId = i64;

/// The five kinds of primary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A group of categories.
    Group,
    /// Who a transaction was paid to (or received from).
    Payee,
    /// A bank account or credit card.
    Account,
    /// A budget category, always linked to one group.
    Category,
    /// A single transaction, linked to a payee, a category and an account.
    Transaction,
}

impl EntityKind {
    /// The name of the table that holds records of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Group => "groups",
            EntityKind::Payee => "payees",
            EntityKind::Account => "accounts",
            EntityKind::Category => "categories",
            EntityKind::Transaction => "transactions",
        }
    }

    /// The name of the primary key column in [EntityKind::table].
    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Group => "group_id",
            EntityKind::Payee => "payee_id",
            EntityKind::Account => "account_id",
            EntityKind::Category => "category_id",
            EntityKind::Transaction => "transaction_id",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Group => "group",
            EntityKind::Payee => "payee",
            EntityKind::Account => "account",
            EntityKind::Category => "category",
            EntityKind::Transaction => "transaction",
        };

        f.write_str(name)
    }
}

/// The attributes stored in a primary record's own table.
///
/// The same shape is used to insert a new record and to overwrite an
/// existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    /// Attributes of a group.
    Group {
        /// The display name.
        name: String,
    },
    /// Attributes of a payee.
    Payee {
        /// The display name.
        name: String,
    },
    /// Attributes of an account.
    Account {
        /// The display name.
        name: String,
        /// The account balance in dollars.
        balance: f64,
    },
    /// Attributes of a category.
    Category {
        /// The display name.
        name: String,
    },
    /// Attributes of a transaction.
    Transaction {
        /// The amount in dollars, negative for expenses.
        amount: f64,
        /// The date the transaction happened.
        date: Date,
    },
}

impl Attributes {
    /// The kind of record these attributes belong to.
    pub fn kind(&self) -> EntityKind {
        match self {
            Attributes::Group { .. } => EntityKind::Group,
            Attributes::Payee { .. } => EntityKind::Payee,
            Attributes::Account { .. } => EntityKind::Account,
            Attributes::Category { .. } => EntityKind::Category,
            Attributes::Transaction { .. } => EntityKind::Transaction,
        }
    }
}

/// A record to be created, along with the records it must be linked to.
#[derive(Debug, Clone, PartialEq)]
pub enum NewEntity {
    /// A new group, owned by the creating user.
    Group {
        /// The display name.
        name: String,
    },
    /// A new payee, owned by the creating user.
    Payee {
        /// The display name.
        name: String,
    },
    /// A new account, owned by the creating user.
    Account {
        /// The display name.
        name: String,
        /// The starting balance in dollars.
        balance: f64,
    },
    /// A new category inside an existing group.
    Category {
        /// The display name.
        name: String,
        /// The group the category belongs to.
        group_id: RecordId,
    },
    /// A new transaction.
    Transaction {
        /// The amount in dollars, negative for expenses.
        amount: f64,
        /// The date the transaction happened.
        date: Date,
        /// Who was paid.
        payee_id: RecordId,
        /// The budget category of the transaction.
        category_id: RecordId,
        /// The account the money moved through.
        account_id: RecordId,
    },
}

impl NewEntity {
    /// The kind of record that will be created.
    pub fn kind(&self) -> EntityKind {
        self.attributes().kind()
    }

    /// The attributes written to the primary record's table.
    pub fn attributes(&self) -> Attributes {
        match self {
            NewEntity::Group { name } => Attributes::Group { name: name.clone() },
            NewEntity::Payee { name } => Attributes::Payee { name: name.clone() },
            NewEntity::Account { name, balance } => Attributes::Account {
                name: name.clone(),
                balance: *balance,
            },
            NewEntity::Category { name, .. } => Attributes::Category { name: name.clone() },
            NewEntity::Transaction { amount, date, .. } => Attributes::Transaction {
                amount: *amount,
                date: *date,
            },
        }
    }
}

/// A group of categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// The ID of the group.
    pub group_id: RecordId,
    /// The display name.
    pub name: String,
}

/// Who a transaction was paid to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    /// The ID of the payee.
    pub payee_id: RecordId,
    /// The display name.
    pub name: String,
}

/// A bank account or credit card and its balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub account_id: RecordId,
    /// The display name.
    pub name: String,
    /// The balance in dollars.
    pub balance: f64,
}

/// A budget category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub category_id: RecordId,
    /// The display name.
    pub name: String,
}

/// An expense or income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub transaction_id: RecordId,
    /// The amount in dollars, negative for expenses.
    pub amount: f64,
    /// The date the transaction happened.
    #[serde(with = "date_format")]
    pub transaction_date: Date,
}

/// Any primary record, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    #[allow(missing_docs)]
    Group(Group),
    #[allow(missing_docs)]
    Payee(Payee),
    #[allow(missing_docs)]
    Account(Account),
    #[allow(missing_docs)]
    Category(Category),
    #[allow(missing_docs)]
    Transaction(Transaction),
}

impl Record {
    /// The store-generated ID of the record.
    pub fn id(&self) -> RecordId {
        match self {
            Record::Group(group) => group.group_id,
            Record::Payee(payee) => payee.payee_id,
            Record::Account(account) => account.account_id,
            Record::Category(category) => category.category_id,
            Record::Transaction(transaction) => transaction.transaction_id,
        }
    }
}

pub mod date_format {
    //! Serializes a [time::Date] as "YYYY-MM-DD".
    //!
    //! The default serde representation of [time::Date] is a year and an
    //! ordinal day, which is not what API clients send.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    #[allow(missing_docs)]
    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .format(DATE_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    #[allow(missing_docs)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
