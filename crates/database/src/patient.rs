//! Patient CRUD operations.

use sqlx::SqlitePool;

use crate::error::{is_unique_violation, DatabaseError, Result};
use crate::models::{NewPatient, Patient};
use crate::validation::{validate_language, validate_name, validate_phone_number};

/// Language assigned when none is given.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Strip the `whatsapp:` channel prefix and surrounding whitespace from an
/// inbound number (e.g. `"whatsapp:+254712345678"` becomes `"+254712345678"`).
pub fn normalize_phone_number(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("whatsapp:")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

fn validate_new_patient(patient: &NewPatient) -> Result<&str> {
    let language = patient.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
    validate_phone_number(&patient.phone_number)?;
    if let Some(name) = patient.name.as_deref() {
        validate_name(name)?;
    }
    validate_language(language)?;
    Ok(language)
}

fn phone_conflict(err: sqlx::Error, phone_number: &str) -> DatabaseError {
    if is_unique_violation(&err) {
        tracing::warn!(phone_number, "Rejected duplicate patient phone number");
        return DatabaseError::UniquenessViolation {
            entity: "Patient",
            field: "phone_number",
            value: phone_number.to_string(),
        };
    }
    DatabaseError::Sqlx(err)
}

/// Create a new patient.
///
/// Fails with [`DatabaseError::UniquenessViolation`] if the phone number is
/// already registered.
pub async fn create_patient(pool: &SqlitePool, patient: &NewPatient) -> Result<Patient> {
    let language = validate_new_patient(patient)?;

    let created = sqlx::query_as::<_, Patient>(
        r#"
        INSERT INTO patients (phone_number, name, language)
        VALUES (?, ?, ?)
        RETURNING id, phone_number, name, language, created_at
        "#,
    )
    .bind(&patient.phone_number)
    .bind(&patient.name)
    .bind(language)
    .fetch_one(pool)
    .await
    .map_err(|e| phone_conflict(e, &patient.phone_number))?;

    tracing::info!(patient_id = created.id, "Created patient");
    Ok(created)
}

/// Get the patient for a phone number, registering them on first contact.
///
/// An existing patient's language is updated when it differs.
pub async fn get_or_create_patient(
    pool: &SqlitePool,
    phone_number: &str,
    language: &str,
) -> Result<Patient> {
    validate_phone_number(phone_number)?;
    validate_language(language)?;

    let patient = sqlx::query_as::<_, Patient>(
        r#"
        INSERT INTO patients (phone_number, language)
        VALUES (?, ?)
        ON CONFLICT(phone_number) DO UPDATE SET
            language = excluded.language
        RETURNING id, phone_number, name, language, created_at
        "#,
    )
    .bind(phone_number)
    .bind(language)
    .fetch_one(pool)
    .await?;

    tracing::debug!(patient_id = patient.id, language, "Resolved patient by phone number");
    Ok(patient)
}

/// Get a patient by ID.
pub async fn get_patient(pool: &SqlitePool, id: i64) -> Result<Patient> {
    sqlx::query_as::<_, Patient>(
        r#"
        SELECT id, phone_number, name, language, created_at
        FROM patients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Patient",
        id: id.to_string(),
    })
}

/// Get a patient by phone number.
pub async fn get_patient_by_phone(pool: &SqlitePool, phone_number: &str) -> Result<Patient> {
    sqlx::query_as::<_, Patient>(
        r#"
        SELECT id, phone_number, name, language, created_at
        FROM patients
        WHERE phone_number = ?
        "#,
    )
    .bind(phone_number)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Patient",
        id: phone_number.to_string(),
    })
}

/// List patients by ID with pagination.
pub async fn list_patients(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<Patient>> {
    let patients = sqlx::query_as::<_, Patient>(
        r#"
        SELECT id, phone_number, name, language, created_at
        FROM patients
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(patients)
}

/// Replace a patient's phone number, name and language.
pub async fn update_patient(pool: &SqlitePool, id: i64, patient: &NewPatient) -> Result<Patient> {
    let language = validate_new_patient(patient)?;

    sqlx::query_as::<_, Patient>(
        r#"
        UPDATE patients
        SET phone_number = ?, name = ?, language = ?
        WHERE id = ?
        RETURNING id, phone_number, name, language, created_at
        "#,
    )
    .bind(&patient.phone_number)
    .bind(&patient.name)
    .bind(language)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| phone_conflict(e, &patient.phone_number))?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Patient",
        id: id.to_string(),
    })
}

/// Delete a patient by ID.
///
/// Their appointments are deleted and their messages are kept with the
/// patient reference cleared. Both happen within this single statement.
pub async fn delete_patient(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM patients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Patient",
            id: id.to_string(),
        });
    }

    tracing::info!(patient_id = id, "Deleted patient");
    Ok(())
}

/// Count total patients.
pub async fn count_patients(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM patients
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
