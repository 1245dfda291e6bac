//! Database models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::DatabaseError;

/// Storage format for every timestamp column (UTC, millisecond precision).
///
/// Fixed width, so lexical order in SQLite matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Format a UTC time the way the store persists it.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp back into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// A person communicating with the clinic, identified by phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Phone number including country code (e.g., "+254712345678").
    pub phone_number: String,
    /// Display name, if known.
    pub name: Option<String>,
    /// Preferred language tag (e.g., "en", "sw").
    pub language: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Input for creating or replacing a patient.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewPatient {
    pub phone_number: String,
    pub name: Option<String>,
    /// Defaults to "en" when absent.
    pub language: Option<String>,
}

impl NewPatient {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Canceled,
    ];

    /// Get the stored value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DatabaseError::ConstraintViolation {
                field: "appointment status",
                value: s.to_string(),
            })
    }
}

/// A scheduled, completed or canceled clinical booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Owning patient.
    pub patient_id: i64,
    /// Scheduled time, stored in [`TIMESTAMP_FORMAT`].
    pub appointment_time: String,
    /// Free-text reason for the visit.
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    /// Creation timestamp.
    pub created_at: String,
    /// Refreshed on every modification.
    pub updated_at: String,
}

impl Appointment {
    /// Scheduled time as a UTC value.
    pub fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.appointment_time)
    }
}

/// Input for booking an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub appointment_time: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Partial update of an appointment's mutable fields.
///
/// `None` leaves a field unchanged. `reason: Some(None)` clears the reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentChanges {
    pub patient_id: Option<i64>,
    pub appointment_time: Option<DateTime<Utc>>,
    pub reason: Option<Option<String>>,
    pub status: Option<AppointmentStatus>,
}

/// Filters for listing appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    /// Inclusive lower bound on the scheduled time.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the scheduled time.
    pub to: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for AppointmentFilter {
    fn default() -> Self {
        Self {
            patient_id: None,
            from: None,
            to: None,
            status: None,
            offset: 0,
            limit: 100,
        }
    }
}

/// Operational state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
    Maintenance,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 3] = [
        AgentStatus::Active,
        AgentStatus::Inactive,
        AgentStatus::Maintenance,
    ];

    /// Get the stored value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DatabaseError::ConstraintViolation {
                field: "agent status",
                value: s.to_string(),
            })
    }
}

/// A named AI role (coordinator, scheduler, FAQ handler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Agent {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Unique agent name, also used as a message sender label.
    pub name: String,
    /// What the agent is responsible for.
    pub role: String,
    pub status: AgentStatus,
    /// Creation timestamp.
    pub created_at: String,
}

/// One communication turn in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Patient the message belongs to; cleared if the patient is deleted.
    pub patient_id: Option<i64>,
    /// Conversation grouping key.
    pub session_id: String,
    /// "patient" or an agent name.
    pub sender: String,
    /// Original message text.
    pub content: String,
    /// Translation of the content, if one was made.
    pub translated_content: Option<String>,
    /// Language tag of the content.
    pub language: Option<String>,
    /// When the message was logged.
    pub timestamp: String,
}

/// Input for logging a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewMessage {
    pub session_id: String,
    pub sender: String,
    pub content: String,
    pub patient_id: Option<i64>,
    pub translated_content: Option<String>,
    pub language: Option<String>,
}

impl NewMessage {
    pub fn new(
        session_id: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            sender: sender.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn for_patient(mut self, patient_id: i64) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn with_translation(
        mut self,
        translated_content: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        self.translated_content = Some(translated_content.into());
        self.language = Some(language.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}
