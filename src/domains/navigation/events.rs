use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavigationEvent {
    BakeCompleted {
        scene: String,
        bake_id: Uuid,
        node_count: usize,
        edge_count: usize,
        lookup_count: usize,
        elapsed_ms: u128,
        timestamp: DateTime<Utc>,
    },
    BakeRejected {
        scene: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    ContextInstalled {
        scene: String,
        node_count: usize,
        has_table: bool,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for NavigationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NavigationEvent::BakeCompleted { .. } => "BakeCompleted",
            NavigationEvent::BakeRejected { .. } => "BakeRejected",
            NavigationEvent::ContextInstalled { .. } => "ContextInstalled",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            NavigationEvent::BakeCompleted { scene, .. } => scene,
            NavigationEvent::BakeRejected { scene, .. } => scene,
            NavigationEvent::ContextInstalled { scene, .. } => scene,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            NavigationEvent::BakeCompleted { timestamp, .. } => *timestamp,
            NavigationEvent::BakeRejected { timestamp, .. } => *timestamp,
            NavigationEvent::ContextInstalled { timestamp, .. } => *timestamp,
        }
    }
}
