use std::time::Duration;
use tracing::{info, warn};

use crate::app::AppState;
use crate::db::queries;
use crate::services::ingest_service;

/// Starts a lightweight ingest scheduler. Every tick it iterates accounts
/// and runs ingestion for those that are due.
pub fn start(state: AppState) {
    tokio::spawn(async move {
        loop {
            // Safety tick: run every 60s; each account has its own sync_frequency_secs to throttle inside loop
            let tick_start = std::time::Instant::now();
            match queries::list_accounts(&state.pool).await {
                Ok(accounts) => {
                    for acc in accounts {
                        if !acc.is_active {
                            continue;
                        }
                        // Skip too frequent syncs: compare last_sync_at with sync_frequency_secs
                        if let Some(last) = acc
                            .last_sync_at
                            .as_deref()
                            .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
                        {
                            let elapsed = chrono::Utc::now().timestamp() - last.timestamp();
                            if elapsed < acc.sync_frequency_secs {
                                continue;
                            }
                        }
                        let st = state.clone();
                        tokio::spawn(async move {
                            match ingest_service::ingest_account(&st, &acc.email).await {
                                Ok(count) => {
                                    info!(email = %acc.email, count, "scheduled ingest completed")
                                }
                                Err(e) => {
                                    warn!(email = %acc.email, error = %e.to_string(), "scheduled ingest failed")
                                }
                            }
                        });
                    }
                }
                Err(e) => warn!("scheduler: list_accounts failed: {}", e),
            }
            // sleep remaining out of 60s
            let elapsed = tick_start.elapsed();
            let sleep_ms = 60_000u64.saturating_sub(elapsed.as_millis() as u64);
            tokio::time::sleep(Duration::from_millis(sleep_ms.max(1))).await;
        }
    });
}
