//! Appointment booking and lifecycle operations.
//!
//! Every mutation goes through [`apply_changes`], which writes the changed
//! fields and refreshes `updated_at` in one `UPDATE` statement. The schema
//! carries a trigger with the same rule for writes made outside this module.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{is_foreign_key_violation, DatabaseError, Result};
use crate::models::{
    format_timestamp, Appointment, AppointmentChanges, AppointmentFilter, AppointmentStatus,
    NewAppointment,
};
use crate::validation::validate_appointment_time;

/// Next `updated_at` value: the current time, or one millisecond past the
/// previous value if the clock has not moved beyond it.
const REFRESH_UPDATED_AT: &str = "CASE \
    WHEN strftime('%Y-%m-%d %H:%M:%f', 'now') > updated_at \
        THEN strftime('%Y-%m-%d %H:%M:%f', 'now') \
    ELSE strftime('%Y-%m-%d %H:%M:%f', updated_at, '+0.001 seconds') \
    END";

fn missing_patient(err: sqlx::Error, patient_id: i64) -> DatabaseError {
    if is_foreign_key_violation(&err) {
        tracing::warn!(patient_id, "Rejected appointment for unknown patient");
        return DatabaseError::ReferentialIntegrityViolation {
            entity: "Patient",
            id: patient_id,
        };
    }
    DatabaseError::Sqlx(err)
}

/// Book a new appointment with status `scheduled`.
///
/// Fails with [`DatabaseError::ReferentialIntegrityViolation`] if the patient
/// does not exist.
pub async fn create_appointment(
    pool: &SqlitePool,
    appointment: &NewAppointment,
) -> Result<Appointment> {
    validate_appointment_time(&appointment.appointment_time)?;

    let created = sqlx::query_as::<_, Appointment>(
        r#"
        INSERT INTO appointments (patient_id, appointment_time, reason, status)
        VALUES (?, ?, ?, ?)
        RETURNING id, patient_id, appointment_time, reason, status, created_at, updated_at
        "#,
    )
    .bind(appointment.patient_id)
    .bind(format_timestamp(&appointment.appointment_time))
    .bind(&appointment.reason)
    .bind(AppointmentStatus::Scheduled)
    .fetch_one(pool)
    .await
    .map_err(|e| missing_patient(e, appointment.patient_id))?;

    tracing::info!(
        appointment_id = created.id,
        patient_id = created.patient_id,
        time = %created.appointment_time,
        "Booked appointment"
    );
    Ok(created)
}

/// Get an appointment by ID.
pub async fn get_appointment(pool: &SqlitePool, id: i64) -> Result<Appointment> {
    sqlx::query_as::<_, Appointment>(
        r#"
        SELECT id, patient_id, appointment_time, reason, status, created_at, updated_at
        FROM appointments
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Appointment",
        id: id.to_string(),
    })
}

/// Write `changes` and refresh `updated_at` atomically.
///
/// Rows whose status equals `unless_status` are left untouched. Returns `None`
/// when no row was updated.
async fn apply_changes(
    pool: &SqlitePool,
    id: i64,
    changes: &AppointmentChanges,
    unless_status: Option<AppointmentStatus>,
) -> Result<Option<Appointment>> {
    if let Some(time) = &changes.appointment_time {
        validate_appointment_time(time)?;
    }

    let query = format!(
        r#"
        UPDATE appointments
        SET patient_id = COALESCE(?, patient_id),
            appointment_time = COALESCE(?, appointment_time),
            reason = CASE WHEN ? THEN ? ELSE reason END,
            status = COALESCE(?, status),
            updated_at = {refresh}
        WHERE id = ? AND (? IS NULL OR status <> ?)
        RETURNING id, patient_id, appointment_time, reason, status, created_at, updated_at
        "#,
        refresh = REFRESH_UPDATED_AT
    );

    let updated = sqlx::query_as::<_, Appointment>(&query)
        .bind(changes.patient_id)
        .bind(changes.appointment_time.as_ref().map(format_timestamp))
        .bind(changes.reason.is_some())
        .bind(changes.reason.as_ref().and_then(|reason| reason.as_deref()))
        .bind(changes.status)
        .bind(id)
        .bind(unless_status)
        .bind(unless_status)
        .fetch_optional(pool)
        .await
        .map_err(|e| match changes.patient_id {
            Some(patient_id) => missing_patient(e, patient_id),
            None => DatabaseError::Sqlx(e),
        })?;

    if let Some(ref appointment) = updated {
        tracing::debug!(
            appointment_id = id,
            status = %appointment.status,
            updated_at = %appointment.updated_at,
            "Updated appointment"
        );
    }

    Ok(updated)
}

/// Update any of an appointment's mutable fields.
pub async fn update_appointment(
    pool: &SqlitePool,
    id: i64,
    changes: &AppointmentChanges,
) -> Result<Appointment> {
    apply_changes(pool, id, changes, None)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Appointment",
            id: id.to_string(),
        })
}

/// Set an appointment's status.
pub async fn update_appointment_status(
    pool: &SqlitePool,
    id: i64,
    status: AppointmentStatus,
) -> Result<Appointment> {
    let changes = AppointmentChanges {
        status: Some(status),
        ..AppointmentChanges::default()
    };
    update_appointment(pool, id, &changes).await
}

/// Move an appointment to a new time.
pub async fn reschedule_appointment(
    pool: &SqlitePool,
    id: i64,
    time: DateTime<Utc>,
) -> Result<Appointment> {
    let changes = AppointmentChanges {
        appointment_time: Some(time),
        ..AppointmentChanges::default()
    };
    update_appointment(pool, id, &changes).await
}

/// Cancel an appointment.
///
/// Fails with [`DatabaseError::AlreadyCanceled`] if it is already canceled.
pub async fn cancel_appointment(pool: &SqlitePool, id: i64) -> Result<Appointment> {
    let changes = AppointmentChanges {
        status: Some(AppointmentStatus::Canceled),
        ..AppointmentChanges::default()
    };

    match apply_changes(pool, id, &changes, Some(AppointmentStatus::Canceled)).await? {
        Some(appointment) => {
            tracing::info!(appointment_id = id, "Canceled appointment");
            Ok(appointment)
        }
        None => {
            // Distinguish a missing row from one that was already canceled.
            get_appointment(pool, id).await?;
            Err(DatabaseError::AlreadyCanceled { id })
        }
    }
}

/// List a patient's appointments in scheduled order.
pub async fn list_appointments_by_patient(
    pool: &SqlitePool,
    patient_id: i64,
) -> Result<Vec<Appointment>> {
    let appointments = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT id, patient_id, appointment_time, reason, status, created_at, updated_at
        FROM appointments
        WHERE patient_id = ?
        ORDER BY appointment_time, id
        "#,
    )
    .bind(patient_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// List appointments matching a filter, in scheduled order.
pub async fn list_appointments(
    pool: &SqlitePool,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>> {
    let from = filter.from.as_ref().map(format_timestamp);
    let to = filter.to.as_ref().map(format_timestamp);

    let appointments = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT id, patient_id, appointment_time, reason, status, created_at, updated_at
        FROM appointments
        WHERE (? IS NULL OR patient_id = ?)
          AND (? IS NULL OR appointment_time >= ?)
          AND (? IS NULL OR appointment_time <= ?)
          AND (? IS NULL OR status = ?)
        ORDER BY appointment_time, id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(filter.patient_id)
    .bind(filter.patient_id)
    .bind(&from)
    .bind(&from)
    .bind(&to)
    .bind(&to)
    .bind(filter.status)
    .bind(filter.status)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// List scheduled appointments at or after `from`, soonest first.
pub async fn list_upcoming_appointments(
    pool: &SqlitePool,
    from: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Appointment>> {
    let appointments = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT id, patient_id, appointment_time, reason, status, created_at, updated_at
        FROM appointments
        WHERE status = ? AND appointment_time >= ?
        ORDER BY appointment_time, id
        LIMIT ?
        "#,
    )
    .bind(AppointmentStatus::Scheduled)
    .bind(format_timestamp(&from))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}
