//! Marmot is a JSON API for tracking a personal budget.
//!
//! Users own groups, payees and accounts directly. Categories belong to a
//! group and transactions link a payee, a category and an account, so users
//! own those through the records they are linked to.
//!
//! Creating a record touches several tables. The store offers no
//! transactions across statements, so every create runs as a
//! [saga](saga::Saga) that undoes its earlier writes when a later one fails.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod category;
mod db;
mod endpoints;
mod group;
mod listing;
mod logging;
mod orchestrator;
mod ownership;
mod payee;
mod record;
mod response;
mod routing;
mod saga;
mod stores;
mod transaction;
mod update_guard;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthenticatedUser, Claims, IdentityResolver, JwtIdentityResolver, UserId, issue_token,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use orchestrator::create;
pub use ownership::{Capability, OwnershipChecker};
pub use record::{Attributes, EntityKind, NewEntity, Record, RecordId};
pub use routing::build_router;
pub use saga::{Saga, Step, StoreOp};
pub use stores::{EntityStore, LinkTable, OwnershipTable, SQLiteStore, StoreError};
pub use update_guard::update;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request had no credential, or the credential was malformed,
    /// expired or rejected.
    #[error("missing or invalid credentials")]
    Unauthenticated,

    /// The caller does not own the resource, or ownership could not be
    /// confirmed.
    #[error("the user does not own the requested resource")]
    Unauthorized,

    /// The request body was malformed or failed validation.
    ///
    /// The string describes the problem and is shown to the client.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// Returned when an update passed the ownership check but matched no
    /// rows, e.g. because the record was deleted in the meantime.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The route exists but does not accept the request method.
    #[error("the route does not accept this method")]
    MethodNotAllowed,

    /// A store operation failed. Any writes made before the failure by the
    /// same operation have been undone.
    #[error("a storage error occurred: {0}")]
    Storage(StoreError),

    /// A store operation failed and at least one of the writes undoing it
    /// failed too, leaving orphaned data behind.
    #[error("a storage error occurred ({cause}) and {} write(s) could not be undone", .uncompensated.len())]
    CompensationFailure {
        /// The error that triggered the compensation.
        cause: StoreError,
        /// The compensating writes that failed.
        uncompensated: Vec<StoreOp>,
    },

    /// A bearer token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Error::Storage(error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthenticated".to_owned()),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            Error::Validation(detail) => (StatusCode::BAD_REQUEST, detail),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_owned()),
            Error::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_owned(),
            ),
            Error::CompensationFailure {
                ref cause,
                ref uncompensated,
            } => {
                tracing::error!("Request failed with {cause} and left orphaned data behind:");
                for write in uncompensated {
                    tracing::error!("  could not undo: {write}");
                }

                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error".to_owned())
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error".to_owned())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
