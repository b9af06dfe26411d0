//! Group domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::permission::PermissionLevel;

/// Where a group was created and what it scopes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupContext {
    Api,
    Course,
    #[default]
    Lesson,
}

impl GroupContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Course => "course",
            Self::Lesson => "lesson",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MembershipMode {
    #[default]
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "optIn")]
    OptIn,
}

impl MembershipMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::OptIn => "optIn",
        }
    }
}

/// A titled partition of a group's members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubGroup {
    pub title: String,
    pub users: Vec<Uuid>,
}

/// A set of users referenced by access-control entries.
///
/// Groups are owned by nobody: lessons and sections only hold
/// references. Once `deleted_at` is set the group is purged after the
/// retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub context: GroupContext,
    pub modus: MembershipMode,
    /// Free text shown to users next to the group.
    pub context_info: Option<String>,
    pub title: String,
    pub users: Vec<Uuid>,
    pub sub_groups: Vec<SubGroup>,
    pub autogenerated: bool,
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    /// The access level this group was provisioned for, if any.
    pub permission: Option<PermissionLevel>,
    pub created_from: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateGroup {
    pub context: GroupContext,
    pub modus: MembershipMode,
    pub context_info: Option<String>,
    pub title: String,
    pub users: Vec<Uuid>,
    pub sub_groups: Vec<SubGroup>,
    pub autogenerated: bool,
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub permission: Option<PermissionLevel>,
    pub created_from: Option<Uuid>,
}
