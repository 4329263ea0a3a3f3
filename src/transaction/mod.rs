//! Endpoints for transactions.
//!
//! A transaction is linked to a payee, a category and an account. It is
//! owned by whoever owns its account.

mod create_endpoint;
mod edit_endpoint;
mod list_endpoints;

pub use create_endpoint::create_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoints::{
    get_account_transactions_endpoint, get_category_transactions_endpoint,
    get_transactions_endpoint,
};
