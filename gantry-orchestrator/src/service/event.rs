//! Event Trigger Service
//!
//! Consumes "document created" notifications from the Status Store's change
//! feed and hands new deployment records to the dispatch service.
//!
//! Delivery is at-least-once: the same creation event may arrive several
//! times, and events for unrelated collections share the feed. Foreign
//! subjects are acknowledged and ignored; duplicates no-op through the
//! dispatch service's pending-only guard. A dispatch failure is absorbed
//! here (the record is already marked failed), so the event source never
//! redelivers a poisoned event.

use gantry_core::dto::event::{DOCUMENT_CREATED, EventNotification};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::{BuildService, JobRunService};
use crate::service::dispatch::{self, DispatchError, DispatchOutcome};

/// Collection whose creation events trigger dispatch
const DEPLOYMENTS_COLLECTION: &str = "deployments";

/// Outcome of processing one change-feed notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Subject did not reference the deployments collection
    Ignored,
    /// Work was dispatched; carries the execution ref or build ID
    Dispatched(String),
    /// Duplicate delivery for a record already in flight or terminal
    AlreadyHandled,
    /// Dispatch could not succeed; the record was marked failed
    Failed(String),
}

/// Extract the deployment ID from a change-feed subject path
///
/// Subjects follow the fixed `.../<collection>/<id>` convention. Returns
/// `None` for subjects outside the deployments collection or with an
/// unparseable ID.
pub fn parse_deployment_subject(subject: &str) -> Option<Uuid> {
    let mut segments = subject.trim_matches('/').rsplit('/');

    let id = segments.next()?;
    let collection = segments.next()?;

    if collection != DEPLOYMENTS_COLLECTION {
        return None;
    }

    Uuid::parse_str(id).ok()
}

/// Process one change-feed notification
///
/// Returns `Ok` for every well-formed notification, including ones whose
/// dispatch failed: transport-level success tells the event source not to
/// redeliver. Only database errors bubble up, since those leave the record
/// state unknown and redelivery is the correct recovery.
pub async fn handle_created_event(
    pool: &PgPool,
    job_runs: &Arc<dyn JobRunService>,
    builds: &Arc<dyn BuildService>,
    event: &EventNotification,
) -> Result<EventOutcome, sqlx::Error> {
    if event.event_type != DOCUMENT_CREATED {
        tracing::debug!("Ignoring event of type {}", event.event_type);
        return Ok(EventOutcome::Ignored);
    }

    let Some(deployment_id) = parse_deployment_subject(&event.subject) else {
        tracing::debug!("Ignoring event for foreign subject {}", event.subject);
        return Ok(EventOutcome::Ignored);
    };

    tracing::info!(
        "Change feed delivered creation of deployment {}",
        deployment_id
    );

    match dispatch::dispatch(pool, job_runs, builds, deployment_id).await {
        Ok(DispatchOutcome::Dispatched(reference)) => Ok(EventOutcome::Dispatched(reference)),
        Ok(DispatchOutcome::AlreadyHandled(_)) => Ok(EventOutcome::AlreadyHandled),
        Err(DispatchError::DatabaseError(err)) => Err(err),
        Err(e) => {
            // Validation, missing records, and submission failures have
            // already marked the record failed; acknowledge the event.
            Ok(EventOutcome::Failed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_subject() {
        let id = Uuid::new_v4();
        let subject = format!("stores/main/documents/deployments/{}", id);
        assert_eq!(parse_deployment_subject(&subject), Some(id));
    }

    #[test]
    fn test_parse_short_subject() {
        let id = Uuid::new_v4();
        let subject = format!("deployments/{}", id);
        assert_eq!(parse_deployment_subject(&subject), Some(id));
    }

    #[test]
    fn test_parse_tolerates_slashes() {
        let id = Uuid::new_v4();
        let subject = format!("/deployments/{}/", id);
        assert_eq!(parse_deployment_subject(&subject), Some(id));
    }

    #[test]
    fn test_foreign_collection_ignored() {
        let id = Uuid::new_v4();
        let subject = format!("stores/main/documents/targets/{}", id);
        assert_eq!(parse_deployment_subject(&subject), None);
    }

    #[test]
    fn test_malformed_id_ignored() {
        assert_eq!(parse_deployment_subject("deployments/not-a-uuid"), None);
        assert_eq!(parse_deployment_subject("deployments"), None);
        assert_eq!(parse_deployment_subject(""), None);
    }
}
