//! SurrealDB implementation of [`SectionRepository`].

use chrono::{DateTime, Utc};
use lessons_core::error::LessonsResult;
use lessons_core::models::section::{CreateSection, Section};
use lessons_core::repository::SectionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{decode_acl, encode_acl, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SectionRow {
    record_id: String,
    lesson_id: String,
    title: String,
    note: String,
    visible: bool,
    position: i64,
    permissions: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl SectionRow {
    fn try_into_section(self) -> Result<Section, DbError> {
        Ok(Section {
            id: parse_uuid(&self.record_id, "section")?,
            lesson_id: parse_uuid(&self.lesson_id, "lesson")?,
            title: self.title,
            note: self.note,
            visible: self.visible,
            position: self.position,
            permissions: decode_acl(self.permissions)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// SurrealDB implementation of the Section repository.
#[derive(Clone)]
pub struct SurrealSectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SectionRepository for SurrealSectionRepository<C> {
    async fn create(&self, input: CreateSection) -> LessonsResult<Section> {
        let id_str = Uuid::new_v4().to_string();
        let permissions = encode_acl(&input.permissions)?;

        let result = self
            .db
            .query(
                "CREATE type::record('section', $id) SET \
                 lesson_id = $lesson_id, title = $title, note = $note, \
                 visible = $visible, position = $position, \
                 permissions = $permissions; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('section', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("lesson_id", input.lesson_id.to_string()))
            .bind(("title", input.title))
            .bind(("note", input.note))
            .bind(("visible", input.visible))
            .bind(("position", input.position))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SectionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "section".into(),
            id: id_str,
        })?;

        Ok(row.try_into_section()?)
    }

    async fn get_by_id(&self, id: Uuid) -> LessonsResult<Section> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('section', $id) \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "section".into(),
            id: id_str,
        })?;

        Ok(row.try_into_section()?)
    }

    async fn find_by_lesson(&self, lesson_id: Uuid) -> LessonsResult<Vec<Section>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM section \
                 WHERE lesson_id = $lesson_id AND deleted_at IS NONE \
                 ORDER BY position ASC, created_at ASC",
            )
            .bind(("lesson_id", lesson_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SectionRow> = result.take(0).map_err(DbError::from)?;

        let sections = rows
            .into_iter()
            .map(SectionRow::try_into_section)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sections)
    }

    async fn delete(&self, id: Uuid) -> LessonsResult<()> {
        self.db
            .query("DELETE type::record('section', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
