use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::channel::{ChannelType, ProviderId};

use super::error::StorageError;
use super::schema::init_database;
use super::{
    IntegrationRecord, IntegrationStore, MessageCountQuery, MessageRecord, MessageStore,
    NewIntegration, NewMessage, PROVIDERS_DB_FILENAME,
};

const INTEGRATION_COLUMNS: &str = "id, organization_id, environment_id, channel, provider_id, \
     name, identifier, active, created_at_ms, updated_at_ms";

pub struct ProviderDatabase {
    conn: Mutex<Connection>,
}

impl ProviderDatabase {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        let db_path = data_dir.join(PROVIDERS_DB_FILENAME);
        let conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        init_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::ConnectionPoisoned)
    }
}

impl MessageStore for ProviderDatabase {
    fn count_messages(&self, query: &MessageCountQuery) -> Result<u64, StorageError> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE environment_id = ?1
              AND channel = ?2
              AND provider_id = ?3
              AND created_at_ms >= ?4
              AND created_at_ms <= ?5
            "#,
            params![
                query.environment_id,
                query.channel.as_str(),
                query.provider_id.as_str(),
                query.period_start.timestamp_millis(),
                query.period_end.timestamp_millis(),
            ],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }

    fn record_message(&self, message: NewMessage) -> Result<MessageRecord, StorageError> {
        let record = MessageRecord::from_new(message, Utc::now());
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO messages (id, organization_id, environment_id, channel, provider_id, created_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.organization_id,
                record.environment_id,
                record.channel.as_str(),
                record.provider_id.as_str(),
                record.created_at.timestamp_millis(),
            ],
        )?;

        Ok(record)
    }
}

impl IntegrationStore for ProviderDatabase {
    fn count_active_integrations(
        &self,
        environment_id: &str,
        channel: ChannelType,
    ) -> Result<u64, StorageError> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM integrations
            WHERE environment_id = ?1
              AND channel = ?2
              AND active = 1
              AND provider_id NOT IN (?3, ?4)
            "#,
            params![
                environment_id,
                channel.as_str(),
                ProviderId::NovuEmail.as_str(),
                ProviderId::NovuSms.as_str()
            ],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }

    fn upsert_integration(
        &self,
        integration: NewIntegration,
    ) -> Result<IntegrationRecord, StorageError> {
        if !integration.provider_id.supports(integration.channel) {
            return Err(StorageError::InvalidRecord(format!(
                "provider {} does not serve the {} channel",
                integration.provider_id, integration.channel
            )));
        }

        let record = IntegrationRecord::from_new(integration, Utc::now());
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO integrations (id, organization_id, environment_id, channel, provider_id,
                                      name, identifier, active, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(environment_id, identifier) DO UPDATE SET
                channel = excluded.channel,
                provider_id = excluded.provider_id,
                name = excluded.name,
                active = excluded.active,
                updated_at_ms = excluded.updated_at_ms
            "#,
            params![
                record.id,
                record.organization_id,
                record.environment_id,
                record.channel.as_str(),
                record.provider_id.as_str(),
                record.name,
                record.identifier,
                record.active,
                record.created_at.timestamp_millis(),
                record.updated_at.timestamp_millis(),
            ],
        )?;

        let sql = format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE environment_id = ?1 AND identifier = ?2"
        );
        let stored = conn.query_row(
            &sql,
            params![record.environment_id, record.identifier],
            integration_from_row,
        )?;

        Ok(stored)
    }

    fn list_integrations(
        &self,
        environment_id: &str,
    ) -> Result<Vec<IntegrationRecord>, StorageError> {
        let conn = self.lock()?;

        let sql = format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE environment_id = ?1 ORDER BY created_at_ms ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![environment_id], integration_from_row)?;

        let mut integrations = Vec::new();
        for row in rows {
            integrations.push(row?);
        }
        Ok(integrations)
    }

    fn set_integration_active(
        &self,
        integration_id: &str,
        active: bool,
    ) -> Result<IntegrationRecord, StorageError> {
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE integrations SET active = ?1, updated_at_ms = ?2 WHERE id = ?3",
            params![active, Utc::now().timestamp_millis(), integration_id],
        )?;
        if updated == 0 {
            return Err(StorageError::IntegrationNotFound(integration_id.to_string()));
        }

        let sql = format!("SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE id = ?1");
        conn.query_row(&sql, params![integration_id], integration_from_row)
            .optional()?
            .ok_or_else(|| StorageError::IntegrationNotFound(integration_id.to_string()))
    }
}

fn integration_from_row(row: &Row<'_>) -> rusqlite::Result<IntegrationRecord> {
    Ok(IntegrationRecord {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        environment_id: row.get(2)?,
        channel: parse_column::<ChannelType>(row, 3)?,
        provider_id: parse_column::<ProviderId>(row, 4)?,
        name: row.get(5)?,
        identifier: row.get(6)?,
        active: row.get(7)?,
        created_at: millis_column(row, 8)?,
        updated_at: millis_column(row, 9)?,
    })
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn millis_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(idx, millis)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn message(environment_id: &str, channel: ChannelType, at: DateTime<Utc>) -> NewMessage {
        NewMessage {
            organization_id: "org-1".into(),
            environment_id: environment_id.into(),
            channel,
            provider_id: channel.hosted_provider().unwrap(),
            created_at: Some(at),
        }
    }

    #[test]
    fn count_respects_scope_and_inclusive_bounds() {
        let temp = tempdir().expect("failed to create temp dir");
        let db = ProviderDatabase::new(temp.path().to_path_buf()).expect("db should open");

        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() - Duration::milliseconds(1);

        db.record_message(message("env-1", ChannelType::Email, start)).unwrap();
        db.record_message(message("env-1", ChannelType::Email, end)).unwrap();
        db.record_message(message("env-1", ChannelType::Email, end + Duration::milliseconds(1)))
            .unwrap();
        db.record_message(message("env-1", ChannelType::Sms, start)).unwrap();
        db.record_message(message("env-2", ChannelType::Email, start)).unwrap();

        let query = MessageCountQuery {
            environment_id: "env-1".into(),
            channel: ChannelType::Email,
            provider_id: ProviderId::NovuEmail,
            period_start: start,
            period_end: end,
        };
        assert_eq!(db.count_messages(&query).unwrap(), 2);

        let other_provider = MessageCountQuery {
            provider_id: ProviderId::SendGrid,
            ..query
        };
        assert_eq!(db.count_messages(&other_provider).unwrap(), 0);
    }

    #[test]
    fn active_count_ignores_hosted_and_inactive_integrations() {
        let temp = tempdir().expect("failed to create temp dir");
        let db = ProviderDatabase::new(temp.path().to_path_buf()).unwrap();

        let new = |provider_id, active, identifier: &str| NewIntegration {
            organization_id: "org-1".into(),
            environment_id: "env-1".into(),
            channel: ChannelType::Email,
            provider_id,
            name: None,
            identifier: Some(identifier.into()),
            active,
        };

        db.upsert_integration(new(ProviderId::NovuEmail, true, "novu-email")).unwrap();
        db.upsert_integration(new(ProviderId::Mailgun, false, "mailgun-1")).unwrap();
        db.upsert_integration(NewIntegration {
            channel: ChannelType::Sms,
            ..new(ProviderId::NovuSms, true, "novu-sms")
        })
        .unwrap();
        assert_eq!(db.count_active_integrations("env-1", ChannelType::Email).unwrap(), 0);
        assert_eq!(db.count_active_integrations("env-1", ChannelType::Sms).unwrap(), 0);

        let sendgrid = db
            .upsert_integration(new(ProviderId::SendGrid, true, "sendgrid-1"))
            .unwrap();
        assert_eq!(sendgrid.name, "SendGrid");
        assert_eq!(db.count_active_integrations("env-1", ChannelType::Email).unwrap(), 1);
        assert_eq!(db.count_active_integrations("env-1", ChannelType::Sms).unwrap(), 0);

        db.set_integration_active(&sendgrid.id, false).unwrap();
        assert_eq!(db.count_active_integrations("env-1", ChannelType::Email).unwrap(), 0);
    }

    #[test]
    fn upsert_keeps_id_for_same_identifier() {
        let temp = tempdir().expect("failed to create temp dir");
        let db = ProviderDatabase::new(temp.path().to_path_buf()).unwrap();

        let mut integration = NewIntegration {
            organization_id: "org-1".into(),
            environment_id: "env-1".into(),
            channel: ChannelType::Sms,
            provider_id: ProviderId::Twilio,
            name: Some("Primary SMS".into()),
            identifier: Some("primary-sms".into()),
            active: true,
        };
        let first = db.upsert_integration(integration.clone()).unwrap();

        integration.provider_id = ProviderId::Plivo;
        let second = db.upsert_integration(integration).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.provider_id, ProviderId::Plivo);
        assert_eq!(db.list_integrations("env-1").unwrap().len(), 1);
    }

    #[test]
    fn set_active_on_missing_integration_fails() {
        let temp = tempdir().expect("failed to create temp dir");
        let db = ProviderDatabase::new(temp.path().to_path_buf()).unwrap();

        let err = db.set_integration_active("missing", true).unwrap_err();
        assert!(matches!(err, StorageError::IntegrationNotFound(id) if id == "missing"));
    }
}
