//! Lesson lifecycle: create, get, find, patch and remove.
//!
//! Every operation authorizes against the lesson's access-control list
//! before touching storage, and reports lower-level failures with a
//! stable per-operation message.

use chrono::Utc;
use lessons_core::collaborator::{CourseMembership, EventSink, SectionService};
use lessons_core::context::RequestContext;
use lessons_core::error::{LessonsError, LessonsResult};
use lessons_core::models::event::{
    LessonEvent, LessonRemoved, MutationAction, MutationEvent, MutationOutcome,
};
use lessons_core::models::lesson::{CreateLesson, Lesson, LessonPatch};
use lessons_core::models::permission::PermissionLevel;
use lessons_core::models::section::CreateSection;
use lessons_core::models::view::{
    CreatedLesson, LessonSections, LessonView, PatchedLesson, RemovedLesson, Scoped,
};
use lessons_core::repository::{GroupRepository, LessonRepository, Paginated};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LessonServiceConfig;
use crate::membership::MembershipResolver;
use crate::permissions::PermissionEvaluator;
use crate::provisioner::{DefaultGroupProvisioner, ProvisionedGroups};
use crate::shaper::{ResultShaper, ScopeSource};

pub const ERR_CREATE: &str = "Failed to create the lesson.";
pub const ERR_GET: &str = "Failed to get the lesson";
pub const ERR_FIND: &str = "Failed to find lessons.";
pub const ERR_PATCH: &str = "Failed to patch the lesson.";
pub const ERR_REMOVE: &str = "Failed to delete the lesson.";
pub const ERR_NO_ACCESS: &str = "You have no access.";

/// Lesson lifecycle manager.
///
/// Generic over its stores and collaborators so the orchestration has
/// no dependency on the database crate or on HTTP.
pub struct LessonService<L, G, S, M, E>
where
    L: LessonRepository,
    G: GroupRepository,
    S: SectionService,
    M: CourseMembership,
    E: EventSink,
{
    lessons: L,
    resolver: MembershipResolver<G>,
    provisioner: DefaultGroupProvisioner<G, M>,
    sections: S,
    events: E,
    evaluator: PermissionEvaluator,
    shaper: ResultShaper,
}

impl<L, G, S, M, E> LessonService<L, G, S, M, E>
where
    L: LessonRepository,
    G: GroupRepository + Clone,
    S: SectionService,
    M: CourseMembership,
    E: EventSink,
{
    pub fn new(
        lessons: L,
        groups: G,
        sections: S,
        membership: M,
        events: E,
        config: LessonServiceConfig,
    ) -> Self {
        let evaluator = PermissionEvaluator::new(config.access);
        Self {
            lessons,
            resolver: MembershipResolver::new(groups.clone()),
            provisioner: DefaultGroupProvisioner::new(groups, membership, config.provisioning),
            sections,
            events,
            shaper: ResultShaper::new(evaluator.clone(), config.pagination),
            evaluator,
        }
    }
}

impl<L, G, S, M, E> LessonService<L, G, S, M, E>
where
    L: LessonRepository,
    G: GroupRepository,
    S: SectionService,
    M: CourseMembership,
    E: EventSink,
{
    // -----------------------------------------------------------------
    // create
    // -----------------------------------------------------------------

    /// Create a lesson in the route's course.
    ///
    /// Provisions the default groups, seeds one empty section with the
    /// same access-control list, then stores the lesson. If a later
    /// step fails, the section is dropped and both groups are
    /// soft-deleted again.
    pub async fn create(
        &self,
        input: CreateLesson,
        ctx: &RequestContext,
    ) -> LessonsResult<CreatedLesson> {
        let result = self
            .create_inner(input, ctx)
            .await
            .map_err(|e| e.into_bad_request(ERR_CREATE));
        self.publish_mutation(MutationAction::Created, ctx, &result);
        result
    }

    async fn create_inner(
        &self,
        input: CreateLesson,
        ctx: &RequestContext,
    ) -> LessonsResult<CreatedLesson> {
        let course_id = course_of(ctx)?;
        input.validate()?;

        let mut lesson = Lesson::new(course_id, input);
        let groups = self.provisioner.provision(&lesson, ctx).await?;
        lesson.permissions = groups.acl();

        let section_ctx = ctx.for_lesson(lesson.id);
        let section = match self
            .sections
            .create(CreateSection::empty(lesson.id, groups.acl()), &section_ctx)
            .await
        {
            Ok(section) => section,
            Err(e) => {
                self.compensate_create(&groups, None, &section_ctx).await;
                return Err(e);
            }
        };
        lesson.sections = vec![section.id];

        if let Err(e) = self.lessons.create(&lesson).await {
            self.compensate_create(&groups, Some(section.id), &section_ctx)
                .await;
            return Err(e);
        }

        info!(
            lesson_id = %lesson.id,
            %course_id,
            created_by = %ctx.principal.id,
            excluded = groups.excluded.len(),
            "Lesson created"
        );

        Ok(CreatedLesson {
            id: lesson.id,
            scope: PermissionLevel::Write,
        })
    }

    async fn compensate_create(
        &self,
        groups: &ProvisionedGroups,
        section_id: Option<Uuid>,
        ctx: &RequestContext,
    ) {
        warn!(
            lesson_id = ?ctx.route.lesson_id,
            ?section_id,
            "Lesson creation failed; undoing partial work"
        );
        if let Some(section_id) = section_id {
            if let Err(e) = self.sections.discard(section_id, ctx).await {
                warn!(%section_id, error = %e, "Failed to discard seeded section");
            }
        }
        self.provisioner.release(groups).await;
    }

    // -----------------------------------------------------------------
    // get
    // -----------------------------------------------------------------

    /// Load one lesson. With `query.all` its readable sections are
    /// fetched alongside and returned in place of the section ids.
    pub async fn get(&self, id: Uuid, ctx: &RequestContext) -> LessonsResult<Scoped<LessonView>> {
        self.get_inner(id, ctx)
            .await
            .map_err(|e| e.into_bad_request(ERR_GET))
    }

    async fn get_inner(&self, id: Uuid, ctx: &RequestContext) -> LessonsResult<Scoped<LessonView>> {
        let course_id = course_of(ctx)?;

        let (lesson, sections) = if ctx.query.all {
            let section_ctx = ctx.for_lesson(id);
            let (lesson, sections) = tokio::join!(
                self.lessons.get_by_id(course_id, id),
                self.sections.find(&section_ctx),
            );
            (lesson, Some(sections))
        } else {
            (self.lessons.get_by_id(course_id, id).await, None)
        };
        let mut lesson = lesson?;
        let sections = sections.transpose()?;

        self.resolver.populate(&mut lesson).await?;
        if !self.evaluator.has_read(&lesson.permissions, &ctx.principal) {
            return Err(LessonsError::forbidden(ERR_NO_ACCESS));
        }
        let scope = self
            .evaluator
            .scope(&lesson.permissions, &ctx.principal)
            .unwrap_or(PermissionLevel::Read);

        let mut view = LessonView::from(lesson);
        if let Some(page) = sections {
            view.sections = LessonSections::Loaded(page.data);
        }

        Ok(self
            .shaper
            .set_user_scope_permission(view, ScopeSource::Level(scope), &ctx.principal))
    }

    // -----------------------------------------------------------------
    // find
    // -----------------------------------------------------------------

    /// Readable lessons of the route's course, one page at a time.
    /// `total` counts readable lessons only.
    pub async fn find(&self, ctx: &RequestContext) -> LessonsResult<Paginated<Scoped<LessonView>>> {
        self.find_inner(ctx)
            .await
            .map_err(|e| e.into_bad_request(ERR_FIND))
    }

    async fn find_inner(
        &self,
        ctx: &RequestContext,
    ) -> LessonsResult<Paginated<Scoped<LessonView>>> {
        let course_id = course_of(ctx)?;

        let mut lessons = self.lessons.find_by_course(course_id).await?;
        self.resolver.populate_all(&mut lessons).await?;

        let readable = self.evaluator.filter_has_read(lessons, &ctx.principal);
        let page = self.shaper.paginate(readable, &ctx.query);

        Ok(self
            .shaper
            .set_user_scope_permission_for_find_requests::<Lesson, LessonView>(
                page,
                &ctx.principal,
            ))
    }

    // -----------------------------------------------------------------
    // patch
    // -----------------------------------------------------------------

    /// Apply an untyped patch payload. Only title, note, visible and
    /// position may be changed; anything else is rejected before the
    /// lesson is loaded.
    pub async fn patch(
        &self,
        id: Uuid,
        data: serde_json::Value,
        ctx: &RequestContext,
    ) -> LessonsResult<PatchedLesson> {
        let result = self
            .patch_inner(id, data, ctx)
            .await
            .map_err(|e| e.into_bad_request(ERR_PATCH));
        self.publish_mutation(MutationAction::Patched, ctx, &result);
        result
    }

    async fn patch_inner(
        &self,
        id: Uuid,
        data: serde_json::Value,
        ctx: &RequestContext,
    ) -> LessonsResult<PatchedLesson> {
        let course_id = course_of(ctx)?;
        let patch = LessonPatch::from_value(data)?;

        let mut lesson = self.load_writable(course_id, id, ctx).await?;
        lesson.apply(&patch);
        self.lessons.save(&lesson).await?;

        Ok(PatchedLesson {
            patch,
            id,
            scope: PermissionLevel::Write,
        })
    }

    // -----------------------------------------------------------------
    // remove
    // -----------------------------------------------------------------

    /// Soft-delete a lesson and announce it to dependent cleanup.
    pub async fn remove(&self, id: Uuid, ctx: &RequestContext) -> LessonsResult<RemovedLesson> {
        let result = self
            .remove_inner(id, ctx)
            .await
            .map_err(|e| e.into_bad_request(ERR_REMOVE));
        self.publish_mutation(MutationAction::Removed, ctx, &result);
        result
    }

    async fn remove_inner(&self, id: Uuid, ctx: &RequestContext) -> LessonsResult<RemovedLesson> {
        let course_id = course_of(ctx)?;

        let mut lesson = self.load_writable(course_id, id, ctx).await?;
        let deleted_at = Utc::now();
        lesson.deleted_at = Some(deleted_at);
        lesson.updated_at = deleted_at;
        self.lessons.save(&lesson).await?;

        info!(lesson_id = %id, %course_id, "Lesson removed");
        self.events.publish(LessonEvent::LessonRemoved(LessonRemoved {
            lesson_id: id,
            course_id,
            deleted_at,
        }));

        Ok(RemovedLesson {
            id,
            deleted_at,
            scope: PermissionLevel::Write,
        })
    }

    // -----------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------

    async fn load_writable(
        &self,
        course_id: Uuid,
        id: Uuid,
        ctx: &RequestContext,
    ) -> LessonsResult<Lesson> {
        let mut lesson = self.lessons.get_by_id(course_id, id).await?;
        self.resolver.populate(&mut lesson).await?;
        if !self.evaluator.has_write(&lesson.permissions, &ctx.principal) {
            return Err(LessonsError::forbidden(ERR_NO_ACCESS));
        }
        Ok(lesson)
    }

    fn publish_mutation<T: Serialize>(
        &self,
        action: MutationAction,
        ctx: &RequestContext,
        result: &LessonsResult<T>,
    ) {
        let outcome = match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(json) => MutationOutcome::Success(json),
                Err(e) => {
                    warn!(error = %e, "Could not serialize mutation result for event");
                    MutationOutcome::Success(serde_json::Value::Null)
                }
            },
            Err(e) => MutationOutcome::Failure(e.to_string()),
        };

        self.events.publish(LessonEvent::Mutation(MutationEvent {
            action,
            path: route_path(ctx),
            outcome,
        }));
    }
}

fn course_of(ctx: &RequestContext) -> LessonsResult<Uuid> {
    ctx.route
        .course_id
        .ok_or_else(|| LessonsError::validation("missing course id in route"))
}

fn route_path(ctx: &RequestContext) -> String {
    match ctx.route.course_id {
        Some(course_id) => format!("course/{course_id}/lessons"),
        None => "lessons".into(),
    }
}
