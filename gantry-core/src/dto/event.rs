//! Change-feed event payloads
//!
//! The Status Store's change feed delivers at-least-once notifications for
//! created documents. Only the event type and the subject path are relied
//! upon; every other field is best-effort.

use serde::{Deserialize, Serialize};

/// Event type emitted when a document is created in a collection
pub const DOCUMENT_CREATED: &str = "document.created";

/// Notification delivered by the change feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventNotification {
    /// Event type string, e.g. `document.created`
    pub event_type: String,
    /// Path of the affected document, `.../<collection>/<id>`
    pub subject: String,
    /// Best-effort extra payload, never relied upon
    #[serde(default)]
    pub data: serde_json::Value,
}
