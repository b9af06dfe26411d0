//! SurrealDB implementation of [`LessonRepository`].

use chrono::{DateTime, Utc};
use lessons_core::error::LessonsResult;
use lessons_core::models::lesson::Lesson;
use lessons_core::repository::LessonRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{decode_acl, encode_acl, parse_uuid, parse_uuids, uuid_strings};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct LessonRow {
    record_id: String,
    course_id: String,
    title: String,
    note: String,
    visible: bool,
    position: i64,
    sections: Vec<String>,
    permissions: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl LessonRow {
    fn try_into_lesson(self) -> Result<Lesson, DbError> {
        Ok(Lesson {
            id: parse_uuid(&self.record_id, "lesson")?,
            course_id: parse_uuid(&self.course_id, "course")?,
            title: self.title,
            note: self.note,
            visible: self.visible,
            position: self.position,
            sections: parse_uuids(&self.sections, "section")?,
            permissions: decode_acl(self.permissions)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// Minimal row returned from writes, used to detect a missed target.
#[derive(Debug, SurrealValue)]
struct TouchedRow {
    #[allow(dead_code)]
    course_id: String,
}

/// SurrealDB implementation of the Lesson repository.
#[derive(Clone)]
pub struct SurrealLessonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLessonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LessonRepository for SurrealLessonRepository<C> {
    async fn create(&self, lesson: &Lesson) -> LessonsResult<()> {
        let permissions = encode_acl(&lesson.permissions)?;

        let result = self
            .db
            .query(
                "CREATE type::record('lesson', $id) SET \
                 course_id = $course_id, title = $title, note = $note, \
                 visible = $visible, position = $position, \
                 sections = $sections, permissions = $permissions, \
                 created_at = $created_at, updated_at = $updated_at",
            )
            .bind(("id", lesson.id.to_string()))
            .bind(("course_id", lesson.course_id.to_string()))
            .bind(("title", lesson.title.clone()))
            .bind(("note", lesson.note.clone()))
            .bind(("visible", lesson.visible))
            .bind(("position", lesson.position))
            .bind(("sections", uuid_strings(&lesson.sections)))
            .bind(("permissions", permissions))
            .bind(("created_at", lesson.created_at))
            .bind(("updated_at", lesson.updated_at))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_by_id(&self, course_id: Uuid, id: Uuid) -> LessonsResult<Lesson> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('lesson', $id) \
                 WHERE course_id = $course_id AND deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LessonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lesson".into(),
            id: id_str,
        })?;

        Ok(row.try_into_lesson()?)
    }

    async fn find_by_course(&self, course_id: Uuid) -> LessonsResult<Vec<Lesson>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lesson \
                 WHERE course_id = $course_id AND deleted_at IS NONE \
                 ORDER BY position ASC, created_at ASC",
            )
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LessonRow> = result.take(0).map_err(DbError::from)?;

        let lessons = rows
            .into_iter()
            .map(LessonRow::try_into_lesson)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(lessons)
    }

    async fn save(&self, lesson: &Lesson) -> LessonsResult<()> {
        let id_str = lesson.id.to_string();
        let permissions = encode_acl(&lesson.permissions)?;

        let result = self
            .db
            .query(
                "UPDATE type::record('lesson', $id) SET \
                 title = $title, note = $note, visible = $visible, \
                 position = $position, sections = $sections, \
                 permissions = $permissions, updated_at = $updated_at, \
                 deleted_at = $deleted_at \
                 WHERE course_id = $course_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("course_id", lesson.course_id.to_string()))
            .bind(("title", lesson.title.clone()))
            .bind(("note", lesson.note.clone()))
            .bind(("visible", lesson.visible))
            .bind(("position", lesson.position))
            .bind(("sections", uuid_strings(&lesson.sections)))
            .bind(("permissions", permissions))
            .bind(("updated_at", lesson.updated_at))
            .bind(("deleted_at", lesson.deleted_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TouchedRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "lesson".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
