//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error, IdentityResolver, JwtIdentityResolver,
    db::initialize,
    stores::{EntityStore, SQLiteStore, StoreError},
};

/// The state of the REST server.
///
/// Built once at startup and cloned into each handler. Handlers take the
/// narrower [StoreState](crate::stores::StoreState) or
/// [IdentityState](crate::auth::IdentityState) instead of the whole struct.
#[derive(Clone)]
pub struct AppState {
    /// The store holding the budget records.
    pub store: Arc<dyn EntityStore>,

    /// Verifies the bearer tokens on incoming requests.
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Create a new [AppState] from its parts.
    pub fn new(store: Arc<dyn EntityStore>, identity: Arc<dyn IdentityResolver>) -> Self {
        Self { store, identity }
    }

    /// Create a new [AppState] backed by a SQLite database that accepts
    /// tokens signed with `jwt_secret`.
    ///
    /// This function will initialize the database by adding the record and
    /// join tables. If `audience` is set, tokens must carry it in their `aud`
    /// claim.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn from_connection(
        db_connection: Connection,
        jwt_secret: &str,
        audience: Option<&str>,
    ) -> Result<Self, Error> {
        initialize(&db_connection).map_err(StoreError::from)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self::new(
            Arc::new(SQLiteStore::new(connection)),
            Arc::new(JwtIdentityResolver::new(jwt_secret, audience)),
        ))
    }
}
