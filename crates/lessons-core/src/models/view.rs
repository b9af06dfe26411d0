//! Response shapes. Views never carry the access-control list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::lesson::{Lesson, LessonPatch};
use crate::models::permission::PermissionLevel;
use crate::models::section::SectionView;

/// A resource annotated with the caller's effective access level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scoped<T> {
    #[serde(flatten)]
    pub resource: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<PermissionLevel>,
}

/// Sections of a lesson: plain references, or loaded through the
/// section service when the caller asked for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LessonSections {
    Ids(Vec<Uuid>),
    Loaded(Vec<Scoped<SectionView>>),
}

impl LessonSections {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Loaded(sections) => sections.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub note: String,
    pub visible: bool,
    pub position: i64,
    pub sections: LessonSections,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lesson> for LessonView {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            note: lesson.note,
            visible: lesson.visible,
            position: lesson.position,
            sections: LessonSections::Ids(lesson.sections),
            created_at: lesson.created_at,
            updated_at: lesson.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedLesson {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub scope: PermissionLevel,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PatchedLesson {
    #[serde(flatten)]
    pub patch: LessonPatch,
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub scope: PermissionLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemovedLesson {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub deleted_at: DateTime<Utc>,
    pub scope: PermissionLevel,
}
