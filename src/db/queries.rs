use sqlx::sqlite::SqlitePool;

use crate::db::now_rfc3339;
use crate::mailsource::RawMessage;
use crate::models::{Account, Category, Message, NotificationRecord};

// Accounts

pub async fn insert_account(pool: &SqlitePool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO accounts (
            id, user_id, email, imap_host, imap_port,
            credentials_encrypted, is_active, sync_frequency_secs,
            last_sync_at, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&account.id)
    .bind(&account.user_id)
    .bind(&account.email)
    .bind(&account.imap_host)
    .bind(account.imap_port)
    .bind(&account.credentials_encrypted)
    .bind(account.is_active)
    .bind(account.sync_frequency_secs)
    .bind(&account.last_sync_at)
    .bind(&account.created_at)
    .bind(&account.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_account_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at")
        .fetch_all(pool)
        .await
}

/// Stamp the account's last-sync time. The only account mutation the
/// pipeline performs.
pub async fn touch_last_sync(pool: &SqlitePool, account_id: &str) -> Result<(), sqlx::Error> {
    let now = now_rfc3339();
    sqlx::query("UPDATE accounts SET last_sync_at = ?, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(&now)
        .bind(account_id)
        .execute(pool)
        .await?;
    Ok(())
}

// Messages

/// Insert-or-update keyed by (account_id, message_id). The conflict clause
/// leaves `category` and `is_read` alone: the label belongs to the
/// classification stage and the read flag to the UI layer. Returns the store
/// id of the row.
pub async fn upsert_message(
    pool: &SqlitePool,
    account: &Account,
    raw: &RawMessage,
) -> Result<i64, sqlx::Error> {
    let now = now_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO messages (
            account_id, user_id, message_id, from_addr, to_addr,
            subject, body, folder, received_at, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(account_id, message_id) DO UPDATE SET
            from_addr = excluded.from_addr,
            to_addr = excluded.to_addr,
            subject = excluded.subject,
            body = excluded.body,
            folder = excluded.folder,
            received_at = excluded.received_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&account.id)
    .bind(&account.user_id)
    .bind(&raw.message_id)
    .bind(&raw.from_addr)
    .bind(&raw.to_addr)
    .bind(&raw.subject)
    .bind(&raw.body)
    .bind(&raw.folder)
    .bind(&raw.received_at)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    sqlx::query_scalar("SELECT id FROM messages WHERE account_id = ? AND message_id = ?")
        .bind(&account.id)
        .bind(&raw.message_id)
        .fetch_one(pool)
        .await
}

pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_message_by_message_id(
    pool: &SqlitePool,
    message_id: &str,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE message_id = ?")
        .bind(message_id)
        .fetch_optional(pool)
        .await
}

/// Persist the classification label. Classification is the only caller.
pub async fn set_category(
    pool: &SqlitePool,
    id: i64,
    category: Category,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE messages SET category = ?, updated_at = ? WHERE id = ?")
        .bind(category.as_str())
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read-flag update, owned by the UI layer.
pub async fn set_read(pool: &SqlitePool, id: i64, read: bool) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE messages SET is_read = ?, updated_at = ? WHERE id = ?")
        .bind(read)
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_messages(
    pool: &SqlitePool,
    account_id: &str,
    limit: i64,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE account_id = ? ORDER BY received_at DESC LIMIT ?",
    )
    .bind(account_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

// Notification audit trail

/// Append one delivery-audit row. Never updated or deleted.
pub async fn insert_notification(
    pool: &SqlitePool,
    email_id: i64,
    webhook_url: &str,
    status: &str,
    response: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO webhook_notifications (email_id, webhook_url, status, response, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(email_id)
    .bind(webhook_url)
    .bind(status)
    .bind(response)
    .bind(now_rfc3339())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn list_notifications(
    pool: &SqlitePool,
    email_id: i64,
) -> Result<Vec<NotificationRecord>, sqlx::Error> {
    sqlx::query_as::<_, NotificationRecord>(
        "SELECT * FROM webhook_notifications WHERE email_id = ? ORDER BY id",
    )
    .bind(email_id)
    .fetch_all(pool)
    .await
}
