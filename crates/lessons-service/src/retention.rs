//! Periodic purge of soft-deleted groups past their retention window.

use lessons_core::error::LessonsResult;
use lessons_core::repository::GroupRepository;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::config::RetentionConfig;

pub struct GroupRetentionSweeper<G: GroupRepository> {
    groups: G,
    config: RetentionConfig,
}

impl<G: GroupRepository> GroupRetentionSweeper<G> {
    pub fn new(groups: G, config: RetentionConfig) -> Self {
        Self { groups, config }
    }

    pub async fn sweep_once(&self) -> LessonsResult<u64> {
        let purged = self.groups.purge_expired(self.config.retention()).await?;
        if purged > 0 {
            info!(purged, "Purged expired groups");
        }
        Ok(purged)
    }

    /// Sweep on every interval tick until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(Duration::from_secs(self.config.sweep_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        warn!(error = %e, "Group retention sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Group retention sweeper stopped");
    }
}
