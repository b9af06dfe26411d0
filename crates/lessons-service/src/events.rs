//! In-process event bus over a tokio broadcast channel.

use lessons_core::collaborator::EventSink;
use lessons_core::models::event::LessonEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Fan-out of lesson events to every subscriber.
///
/// Publishing never blocks; a subscriber that falls behind by more than
/// the channel capacity loses the oldest events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LessonEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LessonEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: LessonEvent) {
        if self.sender.send(event).is_err() {
            debug!("Lesson event dropped: no subscribers");
        }
    }
}
