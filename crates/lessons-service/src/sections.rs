//! The section sub-resource of a lesson.

use lessons_core::collaborator::SectionService;
use lessons_core::context::RequestContext;
use lessons_core::error::{LessonsError, LessonsResult};
use lessons_core::models::section::{CreateSection, Section, SectionView};
use lessons_core::models::view::Scoped;
use lessons_core::repository::{GroupRepository, Paginated, SectionRepository};
use tracing::debug;
use uuid::Uuid;

use crate::config::LessonServiceConfig;
use crate::membership::MembershipResolver;
use crate::permissions::PermissionEvaluator;
use crate::shaper::ResultShaper;

/// [`SectionService`] over a section store, with the same access rules
/// as lessons: reads are filtered per section, writes need write access
/// to the access-control list being stored.
pub struct SectionDirectory<R: SectionRepository, G: GroupRepository> {
    sections: R,
    resolver: MembershipResolver<G>,
    evaluator: PermissionEvaluator,
    shaper: ResultShaper,
}

impl<R: SectionRepository, G: GroupRepository> SectionDirectory<R, G> {
    pub fn new(sections: R, groups: G, config: &LessonServiceConfig) -> Self {
        let evaluator = PermissionEvaluator::new(config.access.clone());
        Self {
            sections,
            resolver: MembershipResolver::new(groups),
            shaper: ResultShaper::new(evaluator.clone(), config.pagination),
            evaluator,
        }
    }
}

fn lesson_of(ctx: &RequestContext) -> LessonsResult<Uuid> {
    ctx.route
        .lesson_id
        .ok_or_else(|| LessonsError::validation("missing lesson id in route"))
}

impl<R: SectionRepository, G: GroupRepository> SectionService for SectionDirectory<R, G> {
    async fn find(&self, ctx: &RequestContext) -> LessonsResult<Paginated<Scoped<SectionView>>> {
        let lesson_id = lesson_of(ctx)?;

        let mut sections = self.sections.find_by_lesson(lesson_id).await?;
        self.resolver.populate_all(&mut sections).await?;

        let readable = self.evaluator.filter_has_read(sections, &ctx.principal);
        let page = self.shaper.paginate(readable, &ctx.query);

        Ok(self
            .shaper
            .set_user_scope_permission_for_find_requests::<Section, SectionView>(
                page,
                &ctx.principal,
            ))
    }

    async fn create(&self, mut input: CreateSection, ctx: &RequestContext) -> LessonsResult<Section> {
        self.resolver.populate(&mut input).await?;
        if !self.evaluator.has_write(&input.permissions, &ctx.principal) {
            return Err(LessonsError::forbidden("You have no access."));
        }

        let section = self.sections.create(input).await?;
        debug!(section_id = %section.id, lesson_id = %section.lesson_id, "Section created");
        Ok(section)
    }

    async fn discard(&self, id: Uuid, _ctx: &RequestContext) -> LessonsResult<()> {
        self.sections.delete(id).await
    }
}
