//! SurrealDB implementation of [`CollectionRepository`].

use chrono::{DateTime, Utc};
use lessons_core::error::LessonsResult;
use lessons_core::models::collection::{Collection, CreateCollection};
use lessons_core::repository::CollectionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CollectionRow {
    record_id: String,
    lesson_id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CollectionRow {
    fn try_into_collection(self) -> Result<Collection, DbError> {
        Ok(Collection {
            id: parse_uuid(&self.record_id, "collection")?,
            lesson_id: parse_uuid(&self.lesson_id, "lesson")?,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Collection repository.
#[derive(Clone)]
pub struct SurrealCollectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCollectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CollectionRepository for SurrealCollectionRepository<C> {
    async fn create(&self, input: CreateCollection) -> LessonsResult<Collection> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('collection', $id) SET \
                 lesson_id = $lesson_id, title = $title; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('collection', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("lesson_id", input.lesson_id.to_string()))
            .bind(("title", input.title))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CollectionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "collection".into(),
            id: id_str,
        })?;

        Ok(row.try_into_collection()?)
    }

    async fn list_by_lesson(&self, lesson_id: Uuid) -> LessonsResult<Vec<Collection>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM collection \
                 WHERE lesson_id = $lesson_id ORDER BY created_at ASC",
            )
            .bind(("lesson_id", lesson_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;

        let collections = rows
            .into_iter()
            .map(CollectionRow::try_into_collection)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(collections)
    }

    async fn delete_by_lesson(&self, lesson_id: Uuid) -> LessonsResult<u64> {
        let lesson_id_str = lesson_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM collection \
                 WHERE lesson_id = $lesson_id GROUP ALL",
            )
            .bind(("lesson_id", lesson_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE collection WHERE lesson_id = $lesson_id")
            .bind(("lesson_id", lesson_id_str))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
