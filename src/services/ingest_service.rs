use tracing::{info, warn};

use crate::app::AppState;
use crate::db::queries;
use crate::error::PipelineError;
use crate::services::pipeline::Job;

/// Ingestion stage: fetch a batch of candidates for the account, upsert each
/// against (account_id, message_id), and hand every stored message to the
/// classification queue. Returns the number of candidates processed.
///
/// One bad candidate never aborts the batch; a missing account does.
pub async fn ingest_account(state: &AppState, account_email: &str) -> Result<u32, PipelineError> {
    let account = queries::get_account_by_email(&state.pool, account_email)
        .await?
        .ok_or_else(|| PipelineError::AccountNotFound(account_email.to_string()))?;

    info!(email = %account.email, "starting ingest");

    let candidates = state.mail_source.fetch_candidates(&account).await?;

    let mut stored = 0u32;
    for raw in &candidates {
        match queries::upsert_message(&state.pool, &account, raw).await {
            Ok(id) => {
                stored += 1;
                state.events.publish("messages", "upsert", id);
                state.dispatcher.enqueue(Job::Classify {
                    message_id: raw.message_id.clone(),
                });
            }
            Err(e) => {
                warn!(message_id = %raw.message_id, error = %e.to_string(), "failed to store candidate, skipping");
            }
        }
    }

    // Stamp last-sync even when individual upserts failed.
    if let Err(e) = queries::touch_last_sync(&state.pool, &account.id).await {
        warn!(account_id = %account.id, error = %e.to_string(), "failed to update last sync time");
    } else {
        state.events.publish("accounts", "update", &account.id);
    }

    info!(
        email = %account.email,
        candidates = candidates.len(),
        stored,
        "ingest completed"
    );

    Ok(candidates.len() as u32)
}
