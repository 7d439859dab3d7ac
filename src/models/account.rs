use anyhow::Result;
/// Connected mailbox account
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub imap_host: String,
    pub imap_port: u16,
    #[serde(skip_serializing)]
    pub credentials_encrypted: String, // Base64 encoded "username:password"
    pub is_active: bool,
    pub sync_frequency_secs: i64,
    pub last_sync_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Account {
    /// Generate account ID from email
    pub fn generate_id(email: &str) -> String {
        format!("acc_{}", email.replace('@', "_").replace('.', "_"))
    }

    /// Encode credentials (simple base64, upgrade to OS keychain later)
    pub fn encode_credentials(username: &str, password: &str) -> String {
        use base64::Engine;
        let creds = format!("{}:{}", username, password);
        base64::engine::general_purpose::STANDARD.encode(creds.as_bytes())
    }

    /// Decode credentials
    pub fn decode_credentials(encoded: &str) -> Result<(String, String)> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        let creds = String::from_utf8(decoded)?;
        let parts: Vec<&str> = creds.splitn(2, ':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid credentials format");
        }
        Ok((parts[0].to_string(), parts[1].to_string()))
    }

    /// Get credentials for this account
    pub fn get_credentials(&self) -> Result<(String, String)> {
        Self::decode_credentials(&self.credentials_encrypted)
    }
}
