//! Events published by the lesson lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Created,
    Patched,
    Removed,
}

/// Outcome of a mutating call, kept for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MutationOutcome {
    Success(serde_json::Value),
    Failure(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationEvent {
    pub action: MutationAction,
    /// Route the mutation was issued on, e.g. `course/{id}/lessons`.
    pub path: String,
    pub outcome: MutationOutcome,
}

/// Raised once a lesson has been soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonRemoved {
    pub lesson_id: Uuid,
    pub course_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LessonEvent {
    Mutation(MutationEvent),
    LessonRemoved(LessonRemoved),
}
