use tracing::{info, warn};

use crate::app::AppState;
use crate::db::queries;
use crate::error::PipelineError;
use crate::models::Category;
use crate::services::pipeline::Job;

/// Classification stage: load the message by its source message-identifier,
/// ask the classifier for a label, persist it, and queue notification when
/// the label is `interested`.
///
/// A classifier failure leaves the stored label untouched; re-running with
/// the same reply is idempotent, so at-least-once redelivery is safe.
pub async fn classify_message(
    state: &AppState,
    message_id: &str,
) -> Result<Category, PipelineError> {
    let message = queries::get_message_by_message_id(&state.pool, message_id)
        .await?
        .ok_or_else(|| PipelineError::MessageNotFound(message_id.to_string()))?;

    let reply = state
        .classifier
        .classify(&message.subject, &message.body)
        .await?;

    // Closed taxonomy: an unrecognized reply is a taxonomy violation and is
    // coerced to uncategorized, never persisted verbatim.
    let category = match Category::parse(&reply) {
        Some(c) => c,
        None => {
            warn!(message_id = %message_id, label = %reply, "classifier reply outside taxonomy, coercing to uncategorized");
            Category::Uncategorized
        }
    };

    queries::set_category(&state.pool, message.id, category).await?;
    state.events.publish("messages", "update", message.id);

    info!(message_id = %message_id, category = category.as_str(), "message classified");

    if category == Category::Interested {
        state.dispatcher.enqueue(Job::Notify {
            email_id: message.id,
        });
    }

    Ok(category)
}
