use tracing::{info, warn};

use crate::app::AppState;
use crate::db::queries;
use crate::error::PipelineError;
use crate::models::DeliveryStatus;

/// Notification stage: deliver the message to both sinks and append one
/// audit record per attempt. Sink failures are best-effort; the stage only
/// fails when the message cannot be loaded.
///
/// The sinks are independently owned external systems: each attempt is
/// isolated so an outage of one cannot suppress delivery to the other.
pub async fn notify_message(state: &AppState, email_id: i64) -> Result<(), PipelineError> {
    let message = queries::get_message(&state.pool, email_id)
        .await?
        .ok_or_else(|| PipelineError::MessageNotFound(email_id.to_string()))?;

    info!(email_id, subject = %message.subject, "notifying sinks");

    let outcomes = [
        state.sinks.deliver_chat(&message).await,
        state.sinks.deliver_generic(&message).await,
    ];

    for outcome in &outcomes {
        match outcome.status {
            DeliveryStatus::Sent => {
                info!(email_id, endpoint = %outcome.endpoint, "notification delivered")
            }
            DeliveryStatus::Failed => {
                warn!(
                    email_id,
                    endpoint = %outcome.endpoint,
                    response = %outcome.response.as_deref().unwrap_or(""),
                    "notification delivery failed"
                )
            }
        }

        if let Err(e) = queries::insert_notification(
            &state.pool,
            message.id,
            &outcome.endpoint,
            outcome.status.as_str(),
            outcome.response.as_deref(),
        )
        .await
        {
            warn!(email_id, endpoint = %outcome.endpoint, error = %e.to_string(), "failed to record notification audit entry");
        }
    }

    state.events.publish("webhook_notifications", "insert", email_id);

    Ok(())
}
