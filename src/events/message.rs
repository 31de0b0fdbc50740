//! Message types for the record event bus

use crate::schema::EntityKind;
use actix::prelude::*;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "record_created")]
    Created,
    #[serde(rename = "record_updated")]
    Updated,
    #[serde(rename = "record_deleted")]
    Deleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "record_created",
            Self::Updated => "record_updated",
            Self::Deleted => "record_deleted",
        }
    }
}

/// A committed change to one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordEvent {
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub entity: EntityKind,
    pub id: i32,
    /// Acting user, when the operation knows one
    pub actor: Option<i32>,
    pub at: NaiveDateTime,
}

impl RecordEvent {
    pub fn new(kind: EventKind, entity: EntityKind, id: i32) -> Self {
        Self {
            kind,
            entity,
            id,
            actor: None,
            at: crate::sanitize::now(),
        }
    }
}

impl Message for RecordEvent {
    type Result = ();
}

/// Register a subscriber
pub struct Subscribe(pub Recipient<RecordEvent>);

impl Message for Subscribe {
    /// Returns subscription ID
    type Result = usize;
}

/// Remove a subscriber
pub struct Unsubscribe(pub usize);

impl Message for Unsubscribe {
    type Result = ();
}

/// Get count of subscribers
pub struct GetSubscriberCount;

impl Message for GetSubscriberCount {
    type Result = usize;
}
