//! End-to-end flows across patients, appointments and the message log.
//!
//! Run with:
//!   cargo test -p database --test store_flow

use chrono::{TimeZone, Utc};
use database::message::PATIENT_SENDER;
use database::{
    appointment, message, patient, AppointmentStatus, Database, DatabaseError, NewAppointment,
    NewMessage, NewPatient,
};

async fn memory_db() -> Database {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test]
async fn test_patient_lifecycle_end_to_end() {
    let db = memory_db().await;
    let pool = db.pool();

    let patient = patient::create_patient(pool, &NewPatient::new("+15551234567"))
        .await
        .unwrap();

    let time = Utc.with_ymd_and_hms(2025, 9, 1, 14, 30, 0).unwrap();
    let booked = appointment::create_appointment(
        pool,
        &NewAppointment {
            patient_id: patient.id,
            appointment_time: time,
            reason: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(booked.status, AppointmentStatus::Scheduled);

    let inbound = message::log_message(
        pool,
        &NewMessage::new(&patient.phone_number, PATIENT_SENDER, "I need to see a doctor")
            .for_patient(patient.id)
            .with_language("en"),
    )
    .await
    .unwrap();

    let completed = appointment::update_appointment_status(
        pool,
        booked.id,
        "completed".parse::<AppointmentStatus>().unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert_ne!(completed.updated_at, booked.updated_at);
    assert!(completed.updated_at > booked.updated_at);

    patient::delete_patient(pool, patient.id).await.unwrap();

    let result = appointment::get_appointment(pool, booked.id).await;
    assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

    let kept = message::get_message(pool, inbound.id).await.unwrap();
    assert!(kept.patient_id.is_none());
    assert_eq!(kept.content, inbound.content);
    assert_eq!(kept.session_id, inbound.session_id);
    assert_eq!(kept.timestamp, inbound.timestamp);
}

#[tokio::test]
async fn test_delete_patient_leaves_other_patients_untouched() {
    let db = memory_db().await;
    let pool = db.pool();

    let leaving = patient::create_patient(pool, &NewPatient::new("+1001")).await.unwrap();
    let staying = patient::create_patient(pool, &NewPatient::new("+1002")).await.unwrap();

    for p in [&leaving, &staying] {
        for day in 1..=3 {
            appointment::create_appointment(
                pool,
                &NewAppointment {
                    patient_id: p.id,
                    appointment_time: Utc.with_ymd_and_hms(2025, 9, day, 9, 0, 0).unwrap(),
                    reason: Some("Review".to_string()),
                },
            )
            .await
            .unwrap();
        }
        message::log_message(
            pool,
            &NewMessage::new(&p.phone_number, PATIENT_SENDER, "hello").for_patient(p.id),
        )
        .await
        .unwrap();
    }

    patient::delete_patient(pool, leaving.id).await.unwrap();

    assert!(appointment::list_appointments_by_patient(pool, leaving.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        appointment::list_appointments_by_patient(pool, staying.id)
            .await
            .unwrap()
            .len(),
        3
    );

    let orphaned = message::list_messages_by_session(pool, &leaving.phone_number)
        .await
        .unwrap();
    assert_eq!(orphaned.len(), 1);
    assert!(orphaned[0].patient_id.is_none());

    let linked = message::list_messages_by_patient(pool, staying.id).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(message::count_messages(pool).await.unwrap(), 2);
}

#[tokio::test]
async fn test_messages_survive_every_other_operation() {
    let db = memory_db().await;
    let pool = db.pool();

    let p = patient::get_or_create_patient(pool, "+254700000001", "sw").await.unwrap();
    let first = message::log_message(
        pool,
        &NewMessage::new("+254700000001", PATIENT_SENDER, "Habari").for_patient(p.id),
    )
    .await
    .unwrap();
    let before = message::list_messages_by_session(pool, "+254700000001").await.unwrap();

    // Unrelated writes do not change existing messages.
    patient::update_patient(pool, p.id, &NewPatient::new("+254700000001").with_name("Wanjiru"))
        .await
        .unwrap();
    let booked = appointment::create_appointment(
        pool,
        &NewAppointment {
            patient_id: p.id,
            appointment_time: Utc::now(),
            reason: None,
        },
    )
    .await
    .unwrap();
    appointment::cancel_appointment(pool, booked.id).await.unwrap();
    let duplicate = patient::create_patient(pool, &NewPatient::new("+254700000001")).await;
    assert!(matches!(
        duplicate,
        Err(DatabaseError::UniquenessViolation { field: "phone_number", .. })
    ));

    let after = message::list_messages_by_session(pool, "+254700000001").await.unwrap();
    assert_eq!(before, after);
    assert_eq!(after[0].id, first.id);
}

#[tokio::test]
async fn test_concurrent_message_appends() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("store.db").display());
    let db = Database::connect_with_pool_size(&url, 8).await.unwrap();
    db.migrate().await.unwrap();

    let patient_id = patient::create_patient(db.pool(), &NewPatient::new("+1555"))
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for worker in 0..8 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            for turn in 0..10 {
                message::log_message(
                    db.pool(),
                    &NewMessage::new(
                        format!("session-{}", worker),
                        "coordinator",
                        format!("turn {}", turn),
                    )
                    .for_patient(patient_id),
                )
                .await
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(message::count_messages(db.pool()).await.unwrap(), 80);
    let session = message::list_messages_by_session(db.pool(), "session-3")
        .await
        .unwrap();
    let contents: Vec<String> = session.into_iter().map(|m| m.content).collect();
    let expected: Vec<String> = (0..10).map(|turn| format!("turn {}", turn)).collect();
    assert_eq!(contents, expected);

    db.close().await;
}

#[tokio::test]
async fn test_concurrent_appointment_writes() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("store.db").display());
    let db = Database::connect_with_pool_size(&url, 8).await.unwrap();
    db.migrate().await.unwrap();

    let patient_id = patient::create_patient(db.pool(), &NewPatient::new("+1666"))
        .await
        .unwrap()
        .id;
    let shared = appointment::create_appointment(
        db.pool(),
        &NewAppointment {
            patient_id,
            appointment_time: Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
            reason: None,
        },
    )
    .await
    .unwrap();

    let mut handles = Vec::new();
    for worker in 0..8u32 {
        let db = db.clone();
        let shared_id = shared.id;
        handles.push(tokio::spawn(async move {
            let mut stamps = Vec::new();
            for turn in 0..5u32 {
                appointment::create_appointment(
                    db.pool(),
                    &NewAppointment {
                        patient_id,
                        appointment_time: Utc
                            .with_ymd_and_hms(2025, 11, worker + 1, 8 + turn, 0, 0)
                            .unwrap(),
                        reason: Some(format!("worker {}", worker)),
                    },
                )
                .await
                .unwrap();

                let status = if turn % 2 == 0 {
                    AppointmentStatus::Completed
                } else {
                    AppointmentStatus::Scheduled
                };
                let updated = appointment::update_appointment_status(db.pool(), shared_id, status)
                    .await
                    .unwrap();
                stamps.push(updated.updated_at);
            }
            stamps
        }));
    }

    let mut stamps = Vec::new();
    for handle in handles {
        stamps.extend(handle.await.unwrap());
    }

    let booked = appointment::list_appointments_by_patient(db.pool(), patient_id)
        .await
        .unwrap();
    assert_eq!(booked.len(), 41);

    // Every status write produced its own, later updated_at.
    stamps.sort();
    stamps.dedup();
    assert_eq!(stamps.len(), 40);
    assert!(stamps[0] > shared.updated_at);
    let last = appointment::get_appointment(db.pool(), shared.id).await.unwrap();
    assert_eq!(last.updated_at, stamps[39]);

    db.close().await;
}
