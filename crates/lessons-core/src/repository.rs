//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Reads of lessons, sections and
//! groups never return soft-deleted documents.

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use crate::error::LessonsResult;
use crate::models::{
    collection::{Collection, CreateCollection},
    group::{CreateGroup, Group},
    lesson::Lesson,
    section::{CreateSection, Section},
};

/// Resolved pagination window for a find request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: 50 }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    /// Size of the whole (already permission-filtered) collection.
    pub total: u64,
    pub limit: u64,
    pub skip: u64,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            skip: self.skip,
        }
    }
}

// ---------------------------------------------------------------------------
// Lessons (course-scoped)
// ---------------------------------------------------------------------------

pub trait LessonRepository: Send + Sync {
    /// Insert a lesson built in memory.
    fn create(&self, lesson: &Lesson) -> impl Future<Output = LessonsResult<()>> + Send;
    fn get_by_id(
        &self,
        course_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LessonsResult<Lesson>> + Send;
    /// All active lessons of a course, ordered by position.
    fn find_by_course(
        &self,
        course_id: Uuid,
    ) -> impl Future<Output = LessonsResult<Vec<Lesson>>> + Send;
    /// Overwrite the stored document with the given state.
    fn save(&self, lesson: &Lesson) -> impl Future<Output = LessonsResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

pub trait GroupRepository: Send + Sync {
    fn create(&self, input: CreateGroup) -> impl Future<Output = LessonsResult<Group>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LessonsResult<Group>> + Send;
    /// Load every active group among `ids`. Unknown ids are skipped.
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = LessonsResult<Vec<Group>>> + Send;
    /// Mark a group deleted; it is purged once the retention window ends.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = LessonsResult<()>> + Send;
    /// Remove groups deleted longer than `retention` ago.
    fn purge_expired(&self, retention: Duration)
    -> impl Future<Output = LessonsResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Sections (lesson-scoped)
// ---------------------------------------------------------------------------

pub trait SectionRepository: Send + Sync {
    fn create(&self, input: CreateSection) -> impl Future<Output = LessonsResult<Section>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LessonsResult<Section>> + Send;
    fn find_by_lesson(
        &self,
        lesson_id: Uuid,
    ) -> impl Future<Output = LessonsResult<Vec<Section>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LessonsResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Collections (lesson-scoped, deleted with their lesson)
// ---------------------------------------------------------------------------

pub trait CollectionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCollection,
    ) -> impl Future<Output = LessonsResult<Collection>> + Send;
    fn list_by_lesson(
        &self,
        lesson_id: Uuid,
    ) -> impl Future<Output = LessonsResult<Vec<Collection>>> + Send;
    /// Delete every collection of a lesson, returning how many went.
    fn delete_by_lesson(&self, lesson_id: Uuid) -> impl Future<Output = LessonsResult<u64>> + Send;
}
