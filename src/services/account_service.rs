/// Account management service
use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::{now_rfc3339, queries};
use crate::models::Account;

/// Add a new email account
pub async fn add_account(
    pool: &SqlitePool,
    email: &str,
    user_id: &str,
    imap_host: Option<String>,
    imap_port: Option<u16>,
    imap_username: Option<String>,
    imap_password: Option<String>,
) -> Result<Account> {
    let id = Account::generate_id(email);

    // Check if account already exists
    let existing = queries::get_account_by_email(pool, email).await?;
    if existing.is_some() {
        anyhow::bail!("Account already exists: {}", email);
    }

    let username = imap_username.unwrap_or_else(|| email.to_string());
    let credentials_encrypted =
        Account::encode_credentials(&username, imap_password.as_deref().unwrap_or(""));
    let now = now_rfc3339();

    let account = Account {
        id,
        user_id: user_id.to_string(),
        email: email.to_string(),
        imap_host: imap_host.unwrap_or_default(),
        imap_port: imap_port.unwrap_or(993),
        credentials_encrypted,
        is_active: true,
        sync_frequency_secs: 300,
        last_sync_at: None,
        created_at: now.clone(),
        updated_at: now,
    };

    queries::insert_account(pool, &account).await?;

    Ok(account)
}

pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<Account>> {
    Ok(queries::list_accounts(pool).await?)
}
