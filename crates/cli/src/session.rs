//! Local session handling for the CLI
//!
//! The JWT is stored in the sqlite session store, encrypted with a
//! machine-bound key, and reloaded for authenticated commands.

use anyhow::{Context, Result};
use habitleague_persistence::{
    sqlite::{create_session, get_active_session, get_session, get_session_token,
             set_active_session, touch_session},
    Database, SessionCipher,
};
use std::path::PathBuf;
use tracing::debug;

/// Default database location: `~/.habitleague/habitleague.db`
pub fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".habitleague").join("habitleague.db")
}

fn cipher() -> Result<SessionCipher> {
    SessionCipher::machine_bound().context("Failed to derive machine key")
}

/// Persist a freshly issued JWT and mark the session active
pub async fn save_session(
    db_path: &PathBuf,
    email: &str,
    user_id: Option<i64>,
    token: &str,
) -> Result<()> {
    let db = Database::connect(db_path).await?;
    let sealed = cipher()?.seal(token)?;

    create_session(db.pool(), email, user_id, &sealed).await?;

    // create_session upserts, so resolve the row id by email
    let session = get_session(db.pool(), email)
        .await?
        .context("Session was not saved")?;
    set_active_session(db.pool(), session.id).await?;
    touch_session(db.pool(), session.id).await?;

    Ok(())
}

/// Load and decrypt the active session's JWT, if any
pub async fn load_active_token(db_path: &PathBuf) -> Result<Option<String>> {
    if !db_path.exists() {
        debug!(path = %db_path.display(), "No session database yet");
        return Ok(None);
    }

    let db = Database::connect(db_path).await?;
    let Some(session) = get_active_session(db.pool()).await? else {
        return Ok(None);
    };

    let Some(sealed) = get_session_token(db.pool(), session.id).await? else {
        return Ok(None);
    };

    let token = cipher()?.open(&sealed)?;
    Ok(Some(token))
}
