//! The API endpoints URIs.
//!
//! Every route lives under [BASE]. For endpoints that take a parameter, e.g.,
//! '/marmot/category/get/{group_id}', use [format_endpoint].

/// The path every route is nested under.
pub const BASE: &str = "/marmot";

/// The route to create a group.
pub const GROUP_CREATE: &str = "/marmot/group/create";
/// The route to list the caller's groups.
pub const GROUP_GET: &str = "/marmot/group/get";
/// The route to rename a group.
pub const GROUP_UPDATE: &str = "/marmot/group/update";

/// The route to create a payee.
pub const PAYEE_CREATE: &str = "/marmot/payee/create";
/// The route to list the caller's payees.
pub const PAYEE_GET: &str = "/marmot/payee/get";
/// The route to rename a payee.
pub const PAYEE_UPDATE: &str = "/marmot/payee/update";

/// The route to create an account.
pub const ACCOUNT_CREATE: &str = "/marmot/account/create";
/// The route to list the caller's accounts.
pub const ACCOUNT_GET: &str = "/marmot/account/get";
/// The route to edit an account.
pub const ACCOUNT_UPDATE: &str = "/marmot/account/update";

/// The route to create a category in a group.
pub const CATEGORY_CREATE: &str = "/marmot/category/create";
/// The route to list the categories in all of the caller's groups.
pub const CATEGORY_GET: &str = "/marmot/category/get";
/// The route to list the categories in one group.
pub const CATEGORY_GET_BY_GROUP: &str = "/marmot/category/get/{group_id}";
/// The route to rename a category.
pub const CATEGORY_UPDATE: &str = "/marmot/category/update";

/// The route to create a transaction.
pub const TRANSACTION_CREATE: &str = "/marmot/transaction/create";
/// The route to list the transactions on all of the caller's accounts.
pub const TRANSACTION_GET: &str = "/marmot/transaction/get";
/// The route to list the transactions on one account.
pub const TRANSACTION_GET_BY_ACCOUNT: &str = "/marmot/transaction/get/account/{account_id}";
/// The route to list the transactions in one category.
pub const TRANSACTION_GET_BY_CATEGORY: &str = "/marmot/transaction/get/category/{category_id}";
/// The route to edit a transaction.
pub const TRANSACTION_UPDATE: &str = "/marmot/transaction/update";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
