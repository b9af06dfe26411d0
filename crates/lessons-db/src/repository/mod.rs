//! SurrealDB repository implementations.

mod collection;
mod group;
mod lesson;
mod section;

pub use collection::SurrealCollectionRepository;
pub use group::SurrealGroupRepository;
pub use lesson::SurrealLessonRepository;
pub use section::SurrealSectionRepository;

use lessons_core::models::permission::{AccessControlEntry, StoredAccessControlEntry};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_uuids(raw: &[String], what: &str) -> Result<Vec<Uuid>, DbError> {
    raw.iter().map(|s| parse_uuid(s, what)).collect()
}

fn uuid_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// Encode an access-control list into its stored `{ level, group_id }` form.
fn encode_acl(acl: &[AccessControlEntry]) -> Result<serde_json::Value, DbError> {
    let stored: Vec<StoredAccessControlEntry> = acl.iter().map(Into::into).collect();
    serde_json::to_value(stored).map_err(|e| DbError::Decode(e.to_string()))
}

/// Decode a stored access-control list. Groups come back as bare ids.
fn decode_acl(value: serde_json::Value) -> Result<Vec<AccessControlEntry>, DbError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let stored: Vec<StoredAccessControlEntry> = serde_json::from_value(value)
        .map_err(|e| DbError::Decode(format!("invalid permissions: {e}")))?;
    Ok(stored.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_core::models::permission::PermissionLevel;

    #[test]
    fn acl_encoding_keeps_order_and_levels() {
        let write = Uuid::new_v4();
        let read = Uuid::new_v4();
        let acl = vec![
            AccessControlEntry::new(PermissionLevel::Write, write),
            AccessControlEntry::new(PermissionLevel::Read, read),
        ];

        let decoded = decode_acl(encode_acl(&acl).unwrap()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].level, PermissionLevel::Write);
        assert_eq!(decoded[0].group.id(), write);
        assert_eq!(decoded[1].level, PermissionLevel::Read);
        assert_eq!(decoded[1].group.id(), read);
    }

    #[test]
    fn malformed_acl_is_a_decode_error() {
        let err = decode_acl(serde_json::json!([{ "level": "admin", "group_id": "x" }])).unwrap_err();
        assert!(matches!(err, DbError::Decode(_)));
    }
}
