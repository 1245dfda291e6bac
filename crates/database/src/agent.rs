//! Agent roster access.
//!
//! The roster is seeded by migrations; agents can be inspected and their
//! status changed, but not created or removed.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Agent, AgentStatus};

/// Names of the agents seeded at schema initialization.
pub const SEED_AGENTS: [&str; 3] = ["coordinator", "scheduler", "faq_agent"];

/// List all agents in seed order.
pub async fn list_agents(pool: &SqlitePool) -> Result<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>(
        r#"
        SELECT id, name, role, status, created_at
        FROM agents
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(agents)
}

/// Get an agent by name.
pub async fn get_agent(pool: &SqlitePool, name: &str) -> Result<Agent> {
    sqlx::query_as::<_, Agent>(
        r#"
        SELECT id, name, role, status, created_at
        FROM agents
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Agent",
        id: name.to_string(),
    })
}

/// Set an agent's status.
pub async fn update_agent_status(
    pool: &SqlitePool,
    name: &str,
    status: AgentStatus,
) -> Result<Agent> {
    let agent = sqlx::query_as::<_, Agent>(
        r#"
        UPDATE agents
        SET status = ?
        WHERE name = ?
        RETURNING id, name, role, status, created_at
        "#,
    )
    .bind(status)
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Agent",
        id: name.to_string(),
    })?;

    tracing::info!(agent = name, status = %status, "Updated agent status");
    Ok(agent)
}

/// List agents currently in the given status.
pub async fn list_agents_by_status(pool: &SqlitePool, status: AgentStatus) -> Result<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>(
        r#"
        SELECT id, name, role, status, created_at
        FROM agents
        WHERE status = ?
        ORDER BY id
        "#,
    )
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(agents)
}
