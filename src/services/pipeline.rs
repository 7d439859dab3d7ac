//! Cross-stage fan-out. Stages enqueue jobs and never wait on, retry, or
//! observe the downstream stage; a dispatcher task drains the queue and
//! spawns one task per job, so jobs for different messages complete
//! concurrently and in no particular order.

use tokio::sync::mpsc;
use tracing::warn;

use crate::app::AppState;
use crate::services::{classify_service, notify_service};

#[derive(Debug, Clone)]
pub enum Job {
    /// Classify a message, addressed by its source message-identifier.
    Classify { message_id: String },
    /// Notify sinks about a message, addressed by its store id.
    Notify { email_id: i64 },
}

pub type JobReceiver = mpsc::UnboundedReceiver<Job>;

#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl Dispatcher {
    pub fn channel() -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget. A closed queue means the process is shutting down;
    /// the job is dropped and logged, never surfaced to the enqueuing stage.
    pub fn enqueue(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("pipeline queue closed, dropping job");
        }
    }
}

/// Start the dispatcher. Each job runs in its own task; a failing job logs
/// and dies alone.
pub fn run(state: AppState, mut jobs: JobReceiver) {
    tokio::spawn(async move {
        while let Some(job) = jobs.recv().await {
            let state = state.clone();
            tokio::spawn(async move {
                match job {
                    Job::Classify { message_id } => {
                        if let Err(e) =
                            classify_service::classify_message(&state, &message_id).await
                        {
                            warn!(message_id = %message_id, error = %e.to_string(), "classification job failed");
                        }
                    }
                    Job::Notify { email_id } => {
                        if let Err(e) = notify_service::notify_message(&state, email_id).await {
                            warn!(email_id, error = %e.to_string(), "notification job failed");
                        }
                    }
                }
            });
        }
    });
}
