//! SurrealDB implementation of [`GroupRepository`].

use chrono::{DateTime, Duration, Utc};
use lessons_core::error::LessonsResult;
use lessons_core::models::group::{CreateGroup, Group, GroupContext, MembershipMode, SubGroup};
use lessons_core::models::permission::PermissionLevel;
use lessons_core::repository::GroupRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, parse_uuids, uuid_strings};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GroupRow {
    record_id: String,
    context: String,
    modus: String,
    context_info: Option<String>,
    title: String,
    users: Vec<String>,
    sub_groups: serde_json::Value,
    autogenerated: bool,
    course_id: Option<String>,
    lesson_id: Option<String>,
    permission: Option<String>,
    created_from: Option<String>,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn parse_context(s: &str) -> Result<GroupContext, DbError> {
    match s {
        "api" => Ok(GroupContext::Api),
        "course" => Ok(GroupContext::Course),
        "lesson" => Ok(GroupContext::Lesson),
        other => Err(DbError::Decode(format!("unknown group context: {other}"))),
    }
}

fn parse_modus(s: &str) -> Result<MembershipMode, DbError> {
    match s {
        "standard" => Ok(MembershipMode::Standard),
        "optIn" => Ok(MembershipMode::OptIn),
        other => Err(DbError::Decode(format!("unknown group modus: {other}"))),
    }
}

fn parse_optional_uuid(raw: Option<&str>, what: &str) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| parse_uuid(s, what)).transpose()
}

impl GroupRow {
    fn try_into_group(self) -> Result<Group, DbError> {
        let sub_groups: Vec<SubGroup> = if self.sub_groups.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(self.sub_groups)
                .map_err(|e| DbError::Decode(format!("invalid sub groups: {e}")))?
        };
        let permission = self
            .permission
            .as_deref()
            .map(str::parse::<PermissionLevel>)
            .transpose()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        Ok(Group {
            id: parse_uuid(&self.record_id, "group")?,
            context: parse_context(&self.context)?,
            modus: parse_modus(&self.modus)?,
            context_info: self.context_info,
            title: self.title,
            users: parse_uuids(&self.users, "user")?,
            sub_groups,
            autogenerated: self.autogenerated,
            course_id: parse_optional_uuid(self.course_id.as_deref(), "course")?,
            lesson_id: parse_optional_uuid(self.lesson_id.as_deref(), "lesson")?,
            permission,
            created_from: parse_optional_uuid(self.created_from.as_deref(), "user")?,
            updated_by: parse_optional_uuid(self.updated_by.as_deref(), "user")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// SurrealDB implementation of the Group repository.
#[derive(Clone)]
pub struct SurrealGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GroupRepository for SurrealGroupRepository<C> {
    async fn create(&self, input: CreateGroup) -> LessonsResult<Group> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let sub_groups =
            serde_json::to_value(&input.sub_groups).map_err(|e| DbError::Decode(e.to_string()))?;

        let result = self
            .db
            .query(
                "CREATE type::record('user_group', $id) SET \
                 context = $context, modus = $modus, \
                 context_info = $context_info, title = $title, \
                 users = $users, sub_groups = $sub_groups, \
                 autogenerated = $autogenerated, \
                 course_id = $course_id, lesson_id = $lesson_id, \
                 permission = $permission, created_from = $created_from; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user_group', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("context", input.context.as_str().to_string()))
            .bind(("modus", input.modus.as_str().to_string()))
            .bind(("context_info", input.context_info))
            .bind(("title", input.title))
            .bind(("users", uuid_strings(&input.users)))
            .bind(("sub_groups", sub_groups))
            .bind(("autogenerated", input.autogenerated))
            .bind(("course_id", input.course_id.map(|id| id.to_string())))
            .bind(("lesson_id", input.lesson_id.map(|id| id.to_string())))
            .bind(("permission", input.permission.map(|p| p.as_str().to_string())))
            .bind(("created_from", input.created_from.map(|id| id.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GroupRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;

        Ok(row.try_into_group()?)
    }

    async fn get_by_id(&self, id: Uuid) -> LessonsResult<Group> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('user_group', $id) \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;

        Ok(row.try_into_group()?)
    }

    async fn get_many(&self, ids: &[Uuid]) -> LessonsResult<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_group \
                 WHERE meta::id(id) IN $ids AND deleted_at IS NONE",
            )
            .bind(("ids", uuid_strings(ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;

        let groups = rows
            .into_iter()
            .map(GroupRow::try_into_group)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(groups)
    }

    async fn soft_delete(&self, id: Uuid) -> LessonsResult<()> {
        self.db
            .query(
                "UPDATE type::record('user_group', $id) SET \
                 deleted_at = time::now(), updated_at = time::now() \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn purge_expired(&self, retention: Duration) -> LessonsResult<u64> {
        // A window reaching past the earliest representable instant
        // expires nothing.
        let cutoff = Utc::now()
            .checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        // Count expired groups first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM user_group \
                 WHERE deleted_at IS NOT NONE AND deleted_at < $cutoff \
                 GROUP ALL",
            )
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE user_group WHERE deleted_at IS NOT NONE AND deleted_at < $cutoff")
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
