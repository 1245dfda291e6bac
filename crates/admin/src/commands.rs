//! Command execution against the store.

use chrono::Utc;
use database::{agent, appointment, message, patient, AppointmentFilter, Database};
use serde_json::{json, Value};
use tracing::info;

use crate::cli::{AgentCommand, AppointmentCommand, Command, MessageCommand, PatientCommand};
use crate::error::Result;

/// Run a command and return its result as JSON.
///
/// Migrations are applied before every command, so a fresh database file is
/// usable immediately.
pub async fn run(db: &Database, command: Command) -> Result<Value> {
    db.migrate().await?;
    let pool = db.pool();

    let output = match command {
        Command::Migrate => {
            let agents = agent::list_agents(pool).await?;
            json!({
                "status": "migrated",
                "patients": patient::count_patients(pool).await?,
                "agents": agents,
            })
        }

        Command::Agents { command } => match command {
            AgentCommand::List => serde_json::to_value(agent::list_agents(pool).await?)?,
            AgentCommand::SetStatus { name, status } => {
                serde_json::to_value(agent::update_agent_status(pool, &name, status).await?)?
            }
        },

        Command::Patients { command } => match command {
            PatientCommand::List { offset, limit } => {
                serde_json::to_value(patient::list_patients(pool, offset, limit).await?)?
            }
            PatientCommand::Show { phone_number } => {
                let phone_number = patient::normalize_phone_number(&phone_number);
                let found = patient::get_patient_by_phone(pool, &phone_number).await?;
                let appointments =
                    appointment::list_appointments_by_patient(pool, found.id).await?;
                json!({ "patient": found, "appointments": appointments })
            }
            PatientCommand::Delete { id } => {
                patient::delete_patient(pool, id).await?;
                info!(patient_id = id, "Patient deleted by operator");
                json!({ "deleted": id })
            }
        },

        Command::Appointments { command } => match command {
            AppointmentCommand::List {
                patient_id,
                from,
                to,
                status,
                offset,
                limit,
            } => {
                let filter = AppointmentFilter {
                    patient_id,
                    from,
                    to,
                    status,
                    offset,
                    limit,
                };
                serde_json::to_value(appointment::list_appointments(pool, &filter).await?)?
            }
            AppointmentCommand::Upcoming { limit } => serde_json::to_value(
                appointment::list_upcoming_appointments(pool, Utc::now(), limit).await?,
            )?,
            AppointmentCommand::SetStatus { id, status } => serde_json::to_value(
                appointment::update_appointment_status(pool, id, status).await?,
            )?,
            AppointmentCommand::Cancel { id } => {
                serde_json::to_value(appointment::cancel_appointment(pool, id).await?)?
            }
        },

        Command::Messages { command } => match command {
            MessageCommand::Session { session_id } => {
                serde_json::to_value(message::list_messages_by_session(pool, &session_id).await?)?
            }
        },
    };

    Ok(output)
}
