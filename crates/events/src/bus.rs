//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries [`AuditEvent`]s from the entity services to any
//! listener (an audit log writer, a notification toast, a test). It is
//! shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use copejem_core::audit::{action_to_category, redact_sensitive_fields};
use copejem_core::types::EntityId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// AuditEvent
// ---------------------------------------------------------------------------

/// Something worth recording about an entity operation.
///
/// Constructed via [`AuditEvent::new`] and enriched with
/// [`with_source`](AuditEvent::with_source),
/// [`with_actor`](AuditEvent::with_actor), and
/// [`with_payload`](AuditEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// One of `copejem_core::audit::action_types`.
    pub action_type: String,

    /// Category derived from the action type.
    pub category: String,

    /// Entity label (e.g. `"Project"`).
    pub entity: Option<String>,

    pub entity_id: Option<EntityId>,

    /// Member that triggered the event.
    pub actor_id: Option<EntityId>,

    /// JSON payload with sensitive keys redacted.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action_type: impl Into<String>) -> Self {
        let action_type = action_type.into();
        Self {
            category: action_to_category(&action_type).to_string(),
            action_type,
            entity: None,
            entity_id: None,
            actor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity: impl Into<String>, entity_id: EntityId) -> Self {
        self.entity = Some(entity.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, actor_id: EntityId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Set the payload. Sensitive keys are redacted before storage.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = redact_sensitive_fields(&payload);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use copejem_events::{AuditEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(AuditEvent::new("entity_create"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<AuditEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: AuditEvent) {
        tracing::debug!(
            action = %event.action_type,
            entity = ?event.entity,
            entity_id = ?event.entity_id,
            "Audit event published"
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use copejem_core::audit::action_types;
    use copejem_core::types::new_id;

    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let project_id = new_id();
        let actor_id = new_id();

        let event = AuditEvent::new(action_types::HISTORICAL_UPDATE)
            .with_source("Project", project_id)
            .with_actor(actor_id)
            .with_payload(serde_json::json!({"name": "Renamed"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.action_type, action_types::HISTORICAL_UPDATE);
        assert_eq!(received.category, "institutional_record");
        assert_eq!(received.entity.as_deref(), Some("Project"));
        assert_eq!(received.entity_id, Some(project_id));
        assert_eq!(received.actor_id, Some(actor_id));
        assert_eq!(received.payload["name"], "Renamed");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(AuditEvent::new(action_types::LOGIN));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.action_type, "login");
        assert_eq!(e2.action_type, "login");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(AuditEvent::new(action_types::LOGOUT));
    }

    #[test]
    fn payload_is_redacted() {
        let event = AuditEvent::new(action_types::ENTITY_UPDATE)
            .with_payload(serde_json::json!({"password": "s1", "phone": "123"}));
        assert_eq!(event.payload["password"], "[REDACTED]");
        assert_eq!(event.payload["phone"], "123");
    }
}
