//! The JSON bodies returned by successful writes.

use serde::{Deserialize, Serialize};

use crate::record::{EntityKind, RecordId};

/// The response to a successful create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// A human readable confirmation.
    pub message: String,
    /// The ID of the new record.
    pub record_id: RecordId,
}

impl CreatedResponse {
    /// Confirm that the `kind` record `record_id` was created.
    pub fn new(kind: EntityKind, record_id: RecordId) -> Self {
        Self {
            message: format!("{} added successfully", capitalized(kind)),
            record_id,
        }
    }
}

/// The response to a successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// A human readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Confirm that a `kind` record was updated.
    pub fn updated(kind: EntityKind) -> Self {
        Self {
            message: format!("{} updated successfully", capitalized(kind)),
        }
    }
}

fn capitalized(kind: EntityKind) -> String {
    let name = kind.to_string();
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}
