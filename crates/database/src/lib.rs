//! SQLite persistence layer for HealthBridge.
//!
//! This crate stores patients, their appointments, the fixed agent roster and
//! the message audit log, using SQLx with SQLite. Integrity rules (unique
//! phone numbers, enumerated statuses, patient references, write-once
//! messages) are enforced by the schema and surfaced as [`DatabaseError`]s.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use database::{appointment, patient, Database, NewAppointment, NewPatient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations (creates tables and seeds agents)
//!     let db = Database::connect("sqlite:healthbridge.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a patient and book an appointment
//!     let patient = patient::create_patient(db.pool(), &NewPatient::new("+15551234567")).await?;
//!     appointment::create_appointment(
//!         db.pool(),
//!         &NewAppointment {
//!             patient_id: patient.id,
//!             appointment_time: Utc::now(),
//!             reason: Some("Checkup".to_string()),
//!         },
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod appointment;
pub mod error;
pub mod message;
pub mod models;
pub mod patient;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    Agent, AgentStatus, Appointment, AppointmentChanges, AppointmentFilter, AppointmentStatus,
    Message, NewAppointment, NewMessage, NewPatient, Patient,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/healthbridge.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// Foreign keys are switched on for every connection; the cascade and
    /// nullify rules on patient deletion depend on it.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// Creates the schema and seeds the agent roster. Safe to call on every
    /// start; applied migrations are skipped.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
