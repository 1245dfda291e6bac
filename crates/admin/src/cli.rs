//! Command-line arguments.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use database::{AgentStatus, AppointmentStatus};

#[derive(Debug, Parser)]
#[command(name = "healthbridge-admin")]
#[command(about = "Inspect and administer the HealthBridge patient store")]
pub struct Args {
    /// SQLite database URL. Falls back to SQLITE_PATH env.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the schema and seed the agent roster
    Migrate,

    /// Agent roster
    Agents {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Patient records
    Patients {
        #[command(subcommand)]
        command: PatientCommand,
    },

    /// Appointments
    Appointments {
        #[command(subcommand)]
        command: AppointmentCommand,
    },

    /// Message audit log
    Messages {
        #[command(subcommand)]
        command: MessageCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AgentCommand {
    /// List all agents
    List,

    /// Set an agent's status (active, inactive, maintenance)
    SetStatus {
        name: String,
        #[arg(value_parser = parse_agent_status)]
        status: AgentStatus,
    },
}

#[derive(Debug, Subcommand)]
pub enum PatientCommand {
    /// List patients
    List {
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },

    /// Show a patient by phone number
    Show { phone_number: String },

    /// Delete a patient, their appointments, and their link to logged messages
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum AppointmentCommand {
    /// List appointments
    List {
        #[arg(long)]
        patient_id: Option<i64>,
        /// Earliest scheduled time (RFC 3339)
        #[arg(long, value_parser = parse_time)]
        from: Option<DateTime<Utc>>,
        /// Latest scheduled time (RFC 3339)
        #[arg(long, value_parser = parse_time)]
        to: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_appointment_status)]
        status: Option<AppointmentStatus>,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },

    /// List scheduled appointments from now on
    Upcoming {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Set an appointment's status (scheduled, completed, canceled)
    SetStatus {
        id: i64,
        #[arg(value_parser = parse_appointment_status)]
        status: AppointmentStatus,
    },

    /// Cancel an appointment
    Cancel { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum MessageCommand {
    /// Show a conversation by session ID
    Session { session_id: String },
}

fn parse_agent_status(s: &str) -> Result<AgentStatus, String> {
    s.parse().map_err(|e: database::DatabaseError| e.to_string())
}

fn parse_appointment_status(s: &str) -> Result<AppointmentStatus, String> {
    s.parse().map_err(|e: database::DatabaseError| e.to_string())
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 time like 2025-07-01T09:00:00Z: {}", e))
}
