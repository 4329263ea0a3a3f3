//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    account::{create_account_endpoint, edit_account_endpoint, get_accounts_endpoint},
    category::{
        create_category_endpoint, get_categories_endpoint, get_group_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    group::{create_group_endpoint, get_groups_endpoint, update_group_endpoint},
    payee::{create_payee_endpoint, get_payees_endpoint, update_payee_endpoint},
    transaction::{
        create_transaction_endpoint, edit_transaction_endpoint, get_account_transactions_endpoint,
        get_category_transactions_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route requires a bearer token, which is checked by the
/// [AuthenticatedUser](crate::AuthenticatedUser) extractor before the handler
/// reads the body or touches the store.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::GROUP_CREATE, post(create_group_endpoint))
        .route(endpoints::GROUP_GET, get(get_groups_endpoint))
        .route(endpoints::GROUP_UPDATE, put(update_group_endpoint))
        .route(endpoints::PAYEE_CREATE, post(create_payee_endpoint))
        .route(endpoints::PAYEE_GET, get(get_payees_endpoint))
        .route(endpoints::PAYEE_UPDATE, put(update_payee_endpoint))
        .route(endpoints::ACCOUNT_CREATE, post(create_account_endpoint))
        .route(endpoints::ACCOUNT_GET, get(get_accounts_endpoint))
        .route(endpoints::ACCOUNT_UPDATE, put(edit_account_endpoint))
        .route(endpoints::CATEGORY_CREATE, post(create_category_endpoint))
        .route(endpoints::CATEGORY_GET, get(get_categories_endpoint))
        .route(
            endpoints::CATEGORY_GET_BY_GROUP,
            get(get_group_categories_endpoint),
        )
        .route(endpoints::CATEGORY_UPDATE, put(update_category_endpoint))
        .route(
            endpoints::TRANSACTION_CREATE,
            post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_GET, get(get_transactions_endpoint))
        .route(
            endpoints::TRANSACTION_GET_BY_ACCOUNT,
            get(get_account_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION_GET_BY_CATEGORY,
            get(get_category_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION_UPDATE,
            put(edit_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(get_405_method_not_allowed)
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

async fn get_405_method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
