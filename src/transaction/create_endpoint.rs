//! Defines the endpoint for creating a new transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::AuthenticatedUser,
    orchestrator,
    record::{EntityKind, NewEntity, RecordId, date_format},
    response::CreatedResponse,
    stores::StoreState,
    validation::{ValidJson, Validate, validate_amount},
};

/// The body of a request to create a transaction.
///
/// The payee, category and account must all be owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTransactionRequest {
    /// Who was paid.
    pub payee_id: RecordId,
    /// The budget category of the transaction.
    pub category_id: RecordId,
    /// The account the money moved through.
    pub account_id: RecordId,
    /// The date the transaction happened, as "YYYY-MM-DD".
    #[serde(with = "date_format")]
    pub date: Date,
    /// The amount in dollars, negative for expenses.
    pub transaction_amount: f64,
}

impl Validate for CreateTransactionRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_amount("transaction_amount", self.transaction_amount)
    }
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<CreateTransactionRequest>,
) -> Result<Json<CreatedResponse>, Error> {
    let new_transaction = NewEntity::Transaction {
        amount: request.transaction_amount,
        date: request.date,
        payee_id: request.payee_id,
        category_id: request.category_id,
        account_id: request.account_id,
    };
    let transaction_id = orchestrator::create(state.store.as_ref(), &new_transaction, &user_id)?;

    Ok(Json(CreatedResponse::new(
        EntityKind::Transaction,
        transaction_id,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        record::Attributes,
        stores::{EntityStore, LinkTable},
        test_utils::{
            Fault, FaultyStore, assert_message, build_test_server, count_rows, insert_owned,
            test_app_state, token_for,
        },
    };

    /// Create a payee, account and category owned by "U1" and return the
    /// body of a valid create request that uses them.
    fn insert_references(store: &FaultyStore) -> Value {
        let payee_id = insert_owned(
            store,
            Attributes::Payee {
                name: "Countdown".to_owned(),
            },
            "U1",
        );
        let account_id = insert_owned(
            store,
            Attributes::Account {
                name: "Checking".to_owned(),
                balance: 500.0,
            },
            "U1",
        );
        let group_id = insert_owned(
            store,
            Attributes::Group {
                name: "Household".to_owned(),
            },
            "U1",
        );
        let category_id = store
            .insert_record(&Attributes::Category {
                name: "Groceries".to_owned(),
            })
            .unwrap();
        store
            .insert_link(LinkTable::CategoryGroup, category_id, group_id)
            .unwrap();

        json!({
            "payee_id": payee_id,
            "category_id": category_id,
            "account_id": account_id,
            "date": "2024-05-17",
            "transaction_amount": -87.2,
        })
    }

    #[tokio::test]
    async fn creates_transaction_with_all_links() {
        let store = Arc::new(FaultyStore::new());
        let body = insert_references(&store);
        let server = build_test_server(test_app_state(store.clone()));

        let response = server
            .post(endpoints::TRANSACTION_CREATE)
            .authorization_bearer(token_for("U1"))
            .json(&body)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "message": "Transaction added successfully",
            "record_id": 1,
        }));
        assert_eq!(count_rows(&store, "transactions"), 1);
        assert_eq!(count_rows(&store, "transaction_payee_join"), 1);
        assert_eq!(count_rows(&store, "transaction_category_join"), 1);
        assert_eq!(count_rows(&store, "transaction_account_join"), 1);
    }

    #[tokio::test]
    async fn failed_account_link_leaves_nothing_behind() {
        let store = Arc::new(
            FaultyStore::new().fail_on(Fault::InsertLink(LinkTable::TransactionAccount)),
        );
        let body = insert_references(&store);
        let server = build_test_server(test_app_state(store.clone()));

        let response = server
            .post(endpoints::TRANSACTION_CREATE)
            .authorization_bearer(token_for("U1"))
            .json(&body)
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_message(&response, "Server Error");
        assert_eq!(count_rows(&store, "transactions"), 0);
        assert_eq!(count_rows(&store, "transaction_payee_join"), 0);
        assert_eq!(count_rows(&store, "transaction_category_join"), 0);
    }

    #[tokio::test]
    async fn other_user_cannot_use_references() {
        let store = Arc::new(FaultyStore::new());
        let body = insert_references(&store);
        let server = build_test_server(test_app_state(store.clone()));

        server
            .post(endpoints::TRANSACTION_CREATE)
            .authorization_bearer(token_for("U2"))
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(count_rows(&store, "transactions"), 0);
    }

    #[tokio::test]
    async fn rejects_invalid_date() {
        let store = Arc::new(FaultyStore::new());
        let mut body = insert_references(&store);
        body["date"] = json!("17/05/2024");
        store.reset_calls();
        let server = build_test_server(test_app_state(store.clone()));

        server
            .post(endpoints::TRANSACTION_CREATE)
            .authorization_bearer(token_for("U1"))
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn rejects_invalid_token_before_store_access() {
        let store = Arc::new(FaultyStore::new());
        let body = insert_references(&store);
        store.reset_calls();
        let server = build_test_server(test_app_state(store.clone()));

        server
            .post(endpoints::TRANSACTION_CREATE)
            .authorization_bearer("not a token")
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(store.calls(), 0);
    }
}
