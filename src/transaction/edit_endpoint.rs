//! Defines the endpoint for updating a transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::AuthenticatedUser,
    record::{Attributes, EntityKind, RecordId, date_format},
    response::MessageResponse,
    stores::StoreState,
    update_guard,
    validation::{ValidJson, Validate, validate_amount},
};

/// The body of a request to change the amount and date of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditTransactionRequest {
    /// The transaction to update.
    pub transaction_id: RecordId,
    /// The new amount in dollars.
    pub transaction_amount: f64,
    /// The new date, as "YYYY-MM-DD".
    #[serde(with = "date_format")]
    pub date: Date,
}

impl Validate for EditTransactionRequest {
    fn validate(&self) -> Result<(), Error> {
        validate_amount("transaction_amount", self.transaction_amount)
    }
}

/// A route handler for updating a transaction on one of the caller's
/// accounts.
pub async fn edit_transaction_endpoint(
    State(state): State<StoreState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidJson(request): ValidJson<EditTransactionRequest>,
) -> Result<Json<MessageResponse>, Error> {
    let attributes = Attributes::Transaction {
        amount: request.transaction_amount,
        date: request.date,
    };

    update_guard::update(
        state.store.as_ref(),
        request.transaction_id,
        &user_id,
        &attributes,
    )?;

    Ok(Json(MessageResponse::updated(EntityKind::Transaction)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode};
    use serde_json::json;
    use time::macros::date;

    use crate::{
        auth::{AuthenticatedUser, UserId},
        endpoints,
        record::{Attributes, EntityKind, Record, RecordId, Transaction},
        stores::{EntityStore, LinkTable, StoreState},
        test_utils::{
            FaultyStore, assert_message, build_test_server, insert_owned, test_app_state,
            token_for,
        },
        validation::ValidJson,
    };

    use super::{EditTransactionRequest, edit_transaction_endpoint};

    /// Insert a transaction on an account owned by "U1".
    fn insert_transaction(store: &FaultyStore) -> RecordId {
        let account_id = insert_owned(
            store,
            Attributes::Account {
                name: "Checking".to_owned(),
                balance: 0.0,
            },
            "U1",
        );
        let transaction_id = store
            .insert_record(&Attributes::Transaction {
                amount: -10.0,
                date: date!(2024 - 01 - 01),
            })
            .unwrap();
        store
            .insert_link(LinkTable::TransactionAccount, transaction_id, account_id)
            .unwrap();

        transaction_id
    }

    #[tokio::test]
    async fn can_edit_transaction() {
        let store = Arc::new(FaultyStore::new());
        let transaction_id = insert_transaction(&store);

        edit_transaction_endpoint(
            State(StoreState {
                store: store.clone(),
            }),
            AuthenticatedUser(UserId::new("U1")),
            ValidJson(EditTransactionRequest {
                transaction_id,
                transaction_amount: -12.34,
                date: date!(2024 - 01 - 02),
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            store.select_records(EntityKind::Transaction, &[transaction_id]),
            Ok(vec![Record::Transaction(Transaction {
                transaction_id,
                amount: -12.34,
                transaction_date: date!(2024 - 01 - 02),
            })])
        );
    }

    #[tokio::test]
    async fn edit_transaction_over_http_checks_account_owner() {
        let store = Arc::new(FaultyStore::new());
        let transaction_id = insert_transaction(&store);
        let server = build_test_server(test_app_state(store.clone()));
        let body = json!({
            "transaction_id": transaction_id,
            "transaction_amount": 5.0,
            "date": "2024-02-03",
        });

        server
            .put(endpoints::TRANSACTION_UPDATE)
            .authorization_bearer(token_for("U2"))
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .put(endpoints::TRANSACTION_UPDATE)
            .authorization_bearer(token_for("U1"))
            .json(&body)
            .await;

        response.assert_status_ok();
        assert_message(&response, "Transaction updated successfully");
    }
}
