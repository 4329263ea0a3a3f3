mod create_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use create_endpoint::create_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use list_endpoint::get_accounts_endpoint;
