//! Defines the endpoint for listing accounts.

use axum::{Json, extract::State};

use crate::{
    Error,
    auth::AuthenticatedUser,
    listing::owned_records,
    record::Record,
    stores::{OwnershipTable, StoreState},
};

/// A route handler for listing the caller's accounts and their balances.
pub async fn get_accounts_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Record>>, Error> {
    owned_records(state.store.as_ref(), OwnershipTable::Account, &user_id).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints,
        record::Attributes,
        stores::OwnershipTable,
        test_utils::{
            Fault, FaultyStore, assert_message, build_test_server, insert_owned, test_app_state,
            token_for,
        },
    };

    #[tokio::test]
    async fn lists_accounts_with_balances() {
        let store = Arc::new(FaultyStore::new());
        for (name, balance, user_id) in [
            ("Checking", 100.5, "U1"),
            ("Savings", 2000.0, "U1"),
            ("Someone else's", 1.0, "U2"),
        ] {
            insert_owned(
                &store,
                Attributes::Account {
                    name: name.to_owned(),
                    balance,
                },
                user_id,
            );
        }
        let server = build_test_server(test_app_state(store.clone()));

        let response = server
            .get(endpoints::ACCOUNT_GET)
            .authorization_bearer(token_for("U1"))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([
            { "account_id": 1, "name": "Checking", "balance": 100.5 },
            { "account_id": 2, "name": "Savings", "balance": 2000.0 },
        ]));
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let store = Arc::new(FaultyStore::new().fail_on(Fault::OwnedIds(OwnershipTable::Account)));
        let server = build_test_server(test_app_state(store.clone()));

        let response = server
            .get(endpoints::ACCOUNT_GET)
            .authorization_bearer(token_for("U1"))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_message(&response, "Server Error");
    }
}
