//! Contracts of the services the lesson core talks to but does not own.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{LessonsResult, MembershipError};
use crate::models::event::LessonEvent;
use crate::models::section::{CreateSection, Section, SectionView};
use crate::models::view::Scoped;
use crate::repository::Paginated;

/// Course roster: user id to the role permission strings they hold.
pub type CourseMembers = HashMap<Uuid, BTreeSet<String>>;

pub trait CourseMembership: Send + Sync {
    fn get_members(
        &self,
        course_id: Uuid,
        authorization: &str,
    ) -> impl Future<Output = Result<CourseMembers, MembershipError>> + Send;
}

/// The section sub-resource, called through its own authorized path so
/// that its permission filtering applies.
pub trait SectionService: Send + Sync {
    /// Readable sections of `ctx.route.lesson_id`.
    fn find(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = LessonsResult<Paginated<Scoped<SectionView>>>> + Send;
    fn create(
        &self,
        input: CreateSection,
        ctx: &RequestContext,
    ) -> impl Future<Output = LessonsResult<Section>> + Send;
    /// Drop a section created during a lesson create that did not finish.
    fn discard(&self, id: Uuid, ctx: &RequestContext)
    -> impl Future<Output = LessonsResult<()>> + Send;
}

/// Fire-and-forget event delivery. Publishing must never block or fail
/// the operation that raised the event.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: LessonEvent);
}
