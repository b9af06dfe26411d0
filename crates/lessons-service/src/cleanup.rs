//! Removes documents that depend on a lesson once it is deleted.

use lessons_core::models::event::{LessonEvent, LessonRemoved, MutationOutcome};
use lessons_core::repository::CollectionRepository;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Subscriber reacting to [`LessonEvent::LessonRemoved`].
pub struct DependentCleanup<C: CollectionRepository> {
    collections: C,
}

impl<C: CollectionRepository> DependentCleanup<C> {
    pub fn new(collections: C) -> Self {
        Self { collections }
    }

    /// Handle a single event. Failures are logged, never propagated:
    /// the lesson itself is already gone.
    pub async fn handle(&self, event: &LessonEvent) {
        match event {
            LessonEvent::LessonRemoved(removed) => self.on_removed(removed).await,
            LessonEvent::Mutation(mutation) => match &mutation.outcome {
                MutationOutcome::Success(_) => {
                    debug!(action = ?mutation.action, path = %mutation.path, "Lesson mutation");
                }
                MutationOutcome::Failure(reason) => {
                    debug!(action = ?mutation.action, path = %mutation.path, %reason, "Lesson mutation failed");
                }
            },
        }
    }

    async fn on_removed(&self, removed: &LessonRemoved) {
        match self.collections.delete_by_lesson(removed.lesson_id).await {
            Ok(count) => info!(
                lesson_id = %removed.lesson_id,
                course_id = %removed.course_id,
                collections = count,
                "Removed collections of deleted lesson"
            ),
            Err(e) => warn!(
                lesson_id = %removed.lesson_id,
                error = %e,
                "Failed to remove collections of deleted lesson"
            ),
        }
    }

    /// Consume events until the bus is closed.
    pub async fn run(self, mut events: broadcast::Receiver<LessonEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Dependent cleanup lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("Dependent cleanup stopped");
    }
}
