//! In-process timers driving the orchestrator.
//!
//! Two independent loops: a frequent due-check for scheduled posts and a
//! slower queue drain. Each tick claims at most one post and processes it to
//! completion; store errors end the tick and the next tick retries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::publish::{Orchestrator, NOTHING_QUEUED, NOTHING_SCHEDULED};

/// Run the scheduled-post check loop forever.
pub async fn scheduled_loop(orchestrator: Arc<Orchestrator>, interval: Duration) {
    loop {
        match orchestrator.publish_scheduled().await {
            Ok(message) => {
                if message == NOTHING_SCHEDULED {
                    debug!("No scheduled post due");
                } else {
                    info!(%message, "Scheduled publish tick");
                }
            }
            Err(e) => error!("Scheduled publish tick failed: {e:#}"),
        }

        tokio::time::sleep(interval).await;
    }
}

/// Run the queue-drain loop forever.
pub async fn queue_loop(orchestrator: Arc<Orchestrator>, interval: Duration) {
    loop {
        match orchestrator.publish_next().await {
            Ok(message) => {
                if message == NOTHING_QUEUED {
                    debug!("Publish queue empty");
                } else {
                    info!(%message, "Queue publish tick");
                }
            }
            Err(e) => error!("Queue publish tick failed: {e:#}"),
        }

        tokio::time::sleep(interval).await;
    }
}
