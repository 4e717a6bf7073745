use anyhow::Result;
use rusqlite::Connection;

pub const MESSAGES_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    environment_id TEXT NOT NULL,
    channel TEXT NOT NULL,
    provider_id TEXT NOT NULL,
    created_at_ms INTEGER NOT NULL
);
"#;

pub const INTEGRATIONS_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS integrations (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    environment_id TEXT NOT NULL,
    channel TEXT NOT NULL,
    provider_id TEXT NOT NULL,
    name TEXT NOT NULL,
    identifier TEXT NOT NULL,
    active INTEGER NOT NULL,
    created_at_ms INTEGER NOT NULL,
    updated_at_ms INTEGER NOT NULL,
    UNIQUE(environment_id, identifier)
);
"#;

pub const STORAGE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_messages_scope
    ON messages(environment_id, channel, provider_id, created_at_ms);
CREATE INDEX IF NOT EXISTS idx_integrations_env_channel
    ON integrations(environment_id, channel, active);
"#;

pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(MESSAGES_TABLE_SCHEMA)?;
    conn.execute_batch(INTEGRATIONS_TABLE_SCHEMA)?;
    conn.execute_batch(STORAGE_INDEXES)?;
    Ok(())
}
