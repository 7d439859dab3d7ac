//! Shared application state and its assembly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;

use crate::classifier::ClassifierClient;
use crate::config::Config;
use crate::events::ChangeFeed;
use crate::mailsource::MailSource;
use crate::services::pipeline::{Dispatcher, JobReceiver};
use crate::sinks::SinkClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub classifier: Arc<ClassifierClient>,
    pub mail_source: Arc<dyn MailSource>,
    pub sinks: Arc<SinkClient>,
    pub dispatcher: Dispatcher,
    pub events: ChangeFeed,
}

impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for ChangeFeed {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}

/// Wire collaborators together. The returned receiver must be handed to
/// `services::pipeline::run` once the state is in place.
pub fn build_state(
    config: Config,
    pool: SqlitePool,
    mail_source: Arc<dyn MailSource>,
) -> Result<(AppState, JobReceiver)> {
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let classifier = Arc::new(ClassifierClient::new(
        config.classifier_url.clone(),
        config.classifier_api_key.clone(),
        config.classifier_model.clone(),
        timeout,
    )?);
    let sinks = Arc::new(SinkClient::new(
        config.chat_webhook_url.clone(),
        config.webhook_url.clone(),
        timeout,
    )?);
    let (dispatcher, jobs) = Dispatcher::channel();

    let state = AppState {
        pool,
        config: Arc::new(config),
        classifier,
        mail_source,
        sinks,
        dispatcher,
        events: ChangeFeed::new(),
    };
    Ok((state, jobs))
}
