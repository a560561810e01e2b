//! Session CRUD operations
//!
//! The JWT itself is stored encrypted (see [`crate::encryption`]); the rest
//! of the row is plaintext metadata for the account picker.

use crate::encryption::SealedToken;
use chrono::{DateTime, Utc};
use habitleague_core::{Error, Result, Session};
use sqlx::SqlitePool;

/// Database row for a saved session
#[derive(Debug, sqlx::FromRow)]
#[allow(dead_code)]
struct SessionRow {
    id: i64,
    email: String,
    user_id: Option<i64>,
    token_encrypted: Vec<u8>,
    nonce: Vec<u8>,
    last_verified: Option<DateTime<Utc>>,
    is_active: i32,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            email: row.email,
            user_id: row.user_id,
            last_verified: row.last_verified,
            is_active: row.is_active != 0,
        }
    }
}

/// Create a new session with encrypted token
pub async fn create_session(
    pool: &SqlitePool,
    email: &str,
    user_id: Option<i64>,
    sealed: &SealedToken,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO sessions (email, user_id, token_encrypted, nonce)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(email) DO UPDATE SET
            token_encrypted = excluded.token_encrypted,
            nonce = excluded.nonce,
            user_id = excluded.user_id
        "#,
    )
    .bind(email)
    .bind(user_id)
    .bind(&sealed.ciphertext)
    .bind(&sealed.nonce[..])
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(result.last_insert_rowid())
}

/// List all saved sessions (without decrypted tokens)
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<Session>> {
    let rows: Vec<SessionRow> = sqlx::query_as(
        r#"
        SELECT id, email, user_id, token_encrypted, nonce, last_verified, is_active
        FROM sessions
        ORDER BY last_verified DESC NULLS LAST
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(rows.into_iter().map(Session::from).collect())
}

/// Get a specific session by email
pub async fn get_session(pool: &SqlitePool, email: &str) -> Result<Option<Session>> {
    let row: Option<SessionRow> = sqlx::query_as(
        r#"
        SELECT id, email, user_id, token_encrypted, nonce, last_verified, is_active
        FROM sessions
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(row.map(Session::from))
}

/// Get the currently active session
pub async fn get_active_session(pool: &SqlitePool) -> Result<Option<Session>> {
    let row: Option<SessionRow> = sqlx::query_as(
        r#"
        SELECT id, email, user_id, token_encrypted, nonce, last_verified, is_active
        FROM sessions
        WHERE is_active = 1
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(row.map(Session::from))
}

/// Get encrypted token for a session
pub async fn get_session_token(pool: &SqlitePool, id: i64) -> Result<Option<SealedToken>> {
    let row: Option<(Vec<u8>, Vec<u8>)> = sqlx::query_as(
        r#"
        SELECT token_encrypted, nonce
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    match row {
        Some((ciphertext, nonce_bytes)) => {
            let nonce: [u8; 12] = nonce_bytes
                .try_into()
                .map_err(|_| Error::DatabaseError("Stored nonce is not 12 bytes".to_string()))?;
            Ok(Some(SealedToken { ciphertext, nonce }))
        }
        None => Ok(None),
    }
}

/// Mark a session as the active one (deactivates all others)
pub async fn set_active_session(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("UPDATE sessions SET is_active = 0")
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    sqlx::query("UPDATE sessions SET is_active = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Record a successful token verification
pub async fn touch_session(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("UPDATE sessions SET last_verified = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Delete a saved session
pub async fn delete_session(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}
