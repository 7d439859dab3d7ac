use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod queries;

/// Connect a pool with a bounded acquire timeout so store access never
/// blocks a stage indefinitely.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Run SQL migrations from the migrations/ directory, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir("migrations")?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.path());
    for e in entries {
        let p = e.path();
        if p.extension().and_then(|s| s.to_str()) == Some("sql") {
            let sql = fs::read_to_string(&p)?;
            sqlx::query(&sql).execute(pool).await?;
        }
    }
    Ok(())
}

/// Accept forms: sqlite:foo.db (fix), sqlite://foo.db (ok), just a path (prepend)
pub fn normalize_sqlite_url(input: &str) -> String {
    if input.starts_with("sqlite://") || input.starts_with("sqlite::memory:") {
        return input.to_string();
    }
    if let Some(rest) = input.strip_prefix("sqlite:") {
        return format!("sqlite://{}", rest);
    }
    format!("sqlite://{}", input)
}

/// File path behind a file-based sqlite URL, if any.
pub fn db_file_path(db_url: &str) -> Option<PathBuf> {
    if db_url.starts_with("sqlite::memory:") || db_url.contains(":memory:") {
        return None;
    }
    let path = db_url.strip_prefix("sqlite://")?;
    let (path, _params) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Ensure the sqlite file exists so the pool can open it (avoids open errors
/// on some setups).
pub fn ensure_db_file(db_url: &str) {
    if let Some(path) = db_file_path(db_url) {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).ok();
            }
        }
        if !Path::new(&path).exists() {
            fs::File::create(&path).ok();
        }
    }
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
