//! Wiring of repositories, collaborators and background tasks.

use lessons_core::context::RequestContext;
use lessons_core::error::LessonsResult;
use lessons_db::repository::{
    SurrealCollectionRepository, SurrealGroupRepository, SurrealLessonRepository,
    SurrealSectionRepository,
};
use lessons_db::{DbManager, run_migrations};
use lessons_service::cleanup::DependentCleanup;
use lessons_service::course::HttpCourseMembership;
use lessons_service::events::EventBus;
use lessons_service::lifecycle::LessonService;
use lessons_service::retention::GroupRetentionSweeper;
use lessons_service::sections::SectionDirectory;
use lessons_service::token;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::config::ServiceConfig;

pub type Sections = SectionDirectory<SurrealSectionRepository<Any>, SurrealGroupRepository<Any>>;

pub type Lessons = LessonService<
    SurrealLessonRepository<Any>,
    SurrealGroupRepository<Any>,
    Sections,
    HttpCourseMembership,
    EventBus,
>;

/// The assembled service. Dropping it closes the event bus, which stops
/// the dependent cleanup task.
pub struct App {
    pub lessons: Lessons,
    /// The `lesson/{id}/sections` sub-resource.
    pub sections: Sections,
    bus: EventBus,
    db: Surreal<Any>,
    config: ServiceConfig,
}

impl App {
    /// Connect to the database, apply migrations and wire the services.
    pub async fn build(config: ServiceConfig) -> anyhow::Result<Self> {
        let db = DbManager::connect(&config.database).await?.client().clone();
        run_migrations(&db).await?;

        let settings = config.lesson_service();
        let groups = SurrealGroupRepository::new(db.clone());
        let bus = EventBus::new(config.events.capacity);
        let membership = HttpCourseMembership::new(&config.course_service)?;

        let lessons = LessonService::new(
            SurrealLessonRepository::new(db.clone()),
            groups.clone(),
            SectionDirectory::new(
                SurrealSectionRepository::new(db.clone()),
                groups.clone(),
                &settings,
            ),
            membership,
            bus.clone(),
            settings.clone(),
        );
        let sections =
            SectionDirectory::new(SurrealSectionRepository::new(db.clone()), groups, &settings);

        info!("Lessons service wired");

        Ok(Self {
            lessons,
            sections,
            bus,
            db,
            config,
        })
    }

    /// Build the request context for a caller presenting `authorization`
    /// on a route under `course_id`.
    pub fn authenticate(&self, authorization: &str, course_id: Uuid) -> LessonsResult<RequestContext> {
        let principal = token::authenticate(authorization, &self.config.auth)?;
        Ok(RequestContext::new(principal, authorization).with_course(course_id))
    }

    /// Start dependent cleanup and the group retention sweeper.
    pub fn spawn_background(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let cleanup = DependentCleanup::new(SurrealCollectionRepository::new(self.db.clone()));
        let sweeper = GroupRetentionSweeper::new(
            SurrealGroupRepository::new(self.db.clone()),
            self.config.retention,
        );

        vec![
            tokio::spawn(cleanup.run(self.bus.subscribe())),
            tokio::spawn(sweeper.run(shutdown)),
        ]
    }
}
