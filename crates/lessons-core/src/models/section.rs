//! Section domain model. Sections are the ordered parts of a lesson.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::permission::{AccessControlEntry, Protected};

#[derive(Debug, Clone)]
pub struct Section {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub note: String,
    pub visible: bool,
    pub position: i64,
    pub permissions: Vec<AccessControlEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Protected for Section {
    fn permissions(&self) -> &[AccessControlEntry] {
        &self.permissions
    }

    fn permissions_mut(&mut self) -> &mut Vec<AccessControlEntry> {
        &mut self.permissions
    }
}

#[derive(Debug, Clone)]
pub struct CreateSection {
    pub lesson_id: Uuid,
    pub title: String,
    pub note: String,
    pub visible: bool,
    pub position: i64,
    pub permissions: Vec<AccessControlEntry>,
}

impl CreateSection {
    /// An untitled section carrying the given access-control list.
    pub fn empty(lesson_id: Uuid, permissions: Vec<AccessControlEntry>) -> Self {
        Self {
            lesson_id,
            title: String::new(),
            note: String::new(),
            visible: true,
            position: 0,
            permissions,
        }
    }
}

impl Protected for CreateSection {
    fn permissions(&self) -> &[AccessControlEntry] {
        &self.permissions
    }

    fn permissions_mut(&mut self) -> &mut Vec<AccessControlEntry> {
        &mut self.permissions
    }
}

/// Section as returned to callers, without its access-control list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub note: String,
    pub visible: bool,
    pub position: i64,
}

impl From<Section> for SectionView {
    fn from(section: Section) -> Self {
        Self {
            id: section.id,
            lesson_id: section.lesson_id,
            title: section.title,
            note: section.note,
            visible: section.visible,
            position: section.position,
        }
    }
}
