//! Access-control entries attached to lessons and sections.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LessonsError;
use crate::models::group::Group;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = LessonsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(LessonsError::validation(format!(
                "unknown permission level: {other}"
            ))),
        }
    }
}

/// A group referenced from an access-control list.
///
/// Freshly loaded documents only carry the group id; the membership
/// resolver swaps those for the loaded group before evaluation.
#[derive(Debug, Clone)]
pub enum GroupRef {
    Id(Uuid),
    Populated(Arc<Group>),
}

impl GroupRef {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Id(id) => *id,
            Self::Populated(group) => group.id,
        }
    }

    pub fn group(&self) -> Option<&Group> {
        match self {
            Self::Id(_) => None,
            Self::Populated(group) => Some(group),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessControlEntry {
    pub level: PermissionLevel,
    pub group: GroupRef,
}

impl AccessControlEntry {
    pub fn new(level: PermissionLevel, group_id: Uuid) -> Self {
        Self {
            level,
            group: GroupRef::Id(group_id),
        }
    }
}

/// Persisted shape of an [`AccessControlEntry`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAccessControlEntry {
    pub level: PermissionLevel,
    pub group_id: Uuid,
}

impl From<&AccessControlEntry> for StoredAccessControlEntry {
    fn from(entry: &AccessControlEntry) -> Self {
        Self {
            level: entry.level,
            group_id: entry.group.id(),
        }
    }
}

impl From<StoredAccessControlEntry> for AccessControlEntry {
    fn from(stored: StoredAccessControlEntry) -> Self {
        Self::new(stored.level, stored.group_id)
    }
}

/// Anything guarded by an access-control list.
pub trait Protected {
    fn permissions(&self) -> &[AccessControlEntry];
    fn permissions_mut(&mut self) -> &mut Vec<AccessControlEntry>;
}
