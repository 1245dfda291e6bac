//! Message audit log.
//!
//! Messages are append-only: there is no update or delete here, and the
//! schema rejects both. A message's patient reference is cleared when the
//! patient is deleted.

use sqlx::SqlitePool;

use crate::error::{is_foreign_key_violation, DatabaseError, Result};
use crate::models::{Message, NewMessage};
use crate::validation::{validate_content, validate_language, validate_sender, validate_session_id};

/// Sender label for messages written by the patient.
pub const PATIENT_SENDER: &str = "patient";

/// Append a message to the log.
pub async fn log_message(pool: &SqlitePool, message: &NewMessage) -> Result<Message> {
    validate_session_id(&message.session_id)?;
    validate_sender(&message.sender)?;
    validate_content(&message.content)?;
    if let Some(language) = message.language.as_deref() {
        validate_language(language)?;
    }

    let logged = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (patient_id, session_id, sender, content, translated_content, language)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, patient_id, session_id, sender, content, translated_content, language, timestamp
        "#,
    )
    .bind(message.patient_id)
    .bind(&message.session_id)
    .bind(&message.sender)
    .bind(&message.content)
    .bind(&message.translated_content)
    .bind(&message.language)
    .fetch_one(pool)
    .await
    .map_err(|e| match message.patient_id {
        Some(patient_id) if is_foreign_key_violation(&e) => {
            tracing::warn!(patient_id, "Rejected message for unknown patient");
            DatabaseError::ReferentialIntegrityViolation {
                entity: "Patient",
                id: patient_id,
            }
        }
        _ => DatabaseError::Sqlx(e),
    })?;

    tracing::debug!(
        message_id = logged.id,
        session_id = %logged.session_id,
        sender = %logged.sender,
        "Logged message"
    );
    Ok(logged)
}

/// Get a conversation in the order it happened.
pub async fn list_messages_by_session(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, patient_id, session_id, sender, content, translated_content, language, timestamp
        FROM messages
        WHERE session_id = ?
        ORDER BY timestamp, id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Get all messages linked to a patient, oldest first.
pub async fn list_messages_by_patient(pool: &SqlitePool, patient_id: i64) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, patient_id, session_id, sender, content, translated_content, language, timestamp
        FROM messages
        WHERE patient_id = ?
        ORDER BY timestamp, id
        "#,
    )
    .bind(patient_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Get a message by ID.
pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<Message> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, patient_id, session_id, sender, content, translated_content, language, timestamp
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Message",
        id: id.to_string(),
    })
}

/// Count total messages.
pub async fn count_messages(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM messages
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
