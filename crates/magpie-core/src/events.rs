//! Sync progress event types.
//!
//! A running sync pushes ordered, one-directional status events to its
//! caller over an mpsc channel; the API layer forwards them as
//! server-sent events. These are status pushes, not request/response
//! pairs: a consumer that stops listening simply drops its receiver,
//! which the orchestrator observes at the next page boundary.

use serde::Serialize;
use uuid::Uuid;

/// One progress notification from a sync run.
///
/// Serialized with a `type` tag matching the client protocol, e.g.
/// `{"type":"page","page":2,"count":100}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    /// The run passed the cooldown gate and started.
    #[serde(rename = "start")]
    Started { run_id: Uuid },
    /// One page of saved posts was fetched.
    #[serde(rename = "page")]
    Page { page: u32, count: usize },
    /// One post was normalized and passed through the dedup gate.
    #[serde(rename = "processing")]
    Processing {
        post_id: String,
        created: bool,
        processed: usize,
    },
    /// The run finished; totals match the finalized sync-log row.
    #[serde(rename = "complete")]
    Completed {
        run_id: Uuid,
        fetched: i64,
        new: i64,
        duplicates: i64,
    },
    /// The run aborted. Terminal; no further events follow.
    #[serde(rename = "error")]
    Error { message: String },
}

impl SyncEvent {
    /// The wire-level event type tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::Started { .. } => "start",
            SyncEvent::Page { .. } => "page",
            SyncEvent::Processing { .. } => "processing",
            SyncEvent::Completed { .. } => "complete",
            SyncEvent::Error { .. } => "error",
        }
    }

    /// Whether this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncEvent::Completed { .. } | SyncEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_event_json_tags() {
        let event = SyncEvent::Started { run_id: Uuid::nil() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"start"#));

        let event = SyncEvent::Page { page: 2, count: 100 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"page"#));
        assert!(json.contains(r#""page":2"#));

        let event = SyncEvent::Processing {
            post_id: "123".to_string(),
            created: true,
            processed: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"processing"#));
        assert!(json.contains(r#""created":true"#));
    }

    #[test]
    fn test_sync_event_complete_json() {
        let event = SyncEvent::Completed {
            run_id: Uuid::nil(),
            fetched: 250,
            new: 240,
            duplicates: 10,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"complete"#));
        assert!(json.contains(r#""fetched":250"#));
        assert!(json.contains(r#""duplicates":10"#));
    }

    #[test]
    fn test_event_type_names_exhaustive() {
        assert_eq!(
            SyncEvent::Started { run_id: Uuid::nil() }.event_type(),
            "start"
        );
        assert_eq!(SyncEvent::Page { page: 0, count: 0 }.event_type(), "page");
        assert_eq!(
            SyncEvent::Processing {
                post_id: String::new(),
                created: false,
                processed: 0,
            }
            .event_type(),
            "processing"
        );
        assert_eq!(
            SyncEvent::Completed {
                run_id: Uuid::nil(),
                fetched: 0,
                new: 0,
                duplicates: 0,
            }
            .event_type(),
            "complete"
        );
        assert_eq!(
            SyncEvent::Error {
                message: String::new(),
            }
            .event_type(),
            "error"
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(SyncEvent::Completed {
            run_id: Uuid::nil(),
            fetched: 0,
            new: 0,
            duplicates: 0,
        }
        .is_terminal());
        assert!(SyncEvent::Error {
            message: "x".to_string(),
        }
        .is_terminal());
        assert!(!SyncEvent::Page { page: 1, count: 1 }.is_terminal());
        assert!(!SyncEvent::Started { run_id: Uuid::nil() }.is_terminal());
    }
}
