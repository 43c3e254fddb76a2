//! SQLite storage for tenant settings.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use ticketdesk_core::{CategoryId, ChannelId, RoleId, TenantId};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError, is_database_locked_error};
use crate::models::{SettingsPatch, TenantSettings};
use crate::store::SettingsStore;

/// Current schema version for migrations.
const SCHEMA_VERSION: i32 = 1;

/// Maximum retries for database lock errors.
const DB_LOCK_MAX_RETRIES: u32 = 5;

/// Initial delay for database lock retry (in milliseconds).
const DB_LOCK_INITIAL_DELAY_MS: u64 = 50;

/// Maximum delay for database lock retry.
const DB_LOCK_MAX_DELAY: Duration = Duration::from_secs(5);

/// Raw column values of one `tenant_settings` row.
type RawRow = (
    Option<i64>,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<String>,
);

/// SQLite-backed [`SettingsStore`].
///
/// The connection is shared behind a mutex and every statement runs on the
/// blocking thread pool, so async callers never stall the runtime on disk I/O.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSettingsStore {
    /// Open or create a settings database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(250))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Execute a database operation with automatic retry on lock errors.
    fn with_retry<T, F>(operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0;
        let mut delay = Duration::from_millis(DB_LOCK_INITIAL_DELAY_MS);

        loop {
            attempt += 1;

            match f() {
                Ok(result) => {
                    if attempt > 1 {
                        info!(attempt, operation, "Database operation succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(ref e) if is_database_locked_error(e) && attempt <= DB_LOCK_MAX_RETRIES => {
                    warn!(
                        attempt,
                        max_retries = DB_LOCK_MAX_RETRIES,
                        delay_ms = delay.as_millis(),
                        operation,
                        "Database locked, retrying with backoff"
                    );

                    std::thread::sleep(delay);

                    delay = std::cmp::min(delay * 2, DB_LOCK_MAX_DELAY);
                }
                Err(e) if is_database_locked_error(&e) => {
                    warn!(attempt, operation, error = %e, "Database still locked, giving up");
                    return Err(StoreError::DatabaseLocked {
                        retry_count: attempt - 1,
                        max_retries: DB_LOCK_MAX_RETRIES,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    if attempt > 1 {
                        warn!(attempt, operation, error = %e, "Database operation failed after retries");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Run `f` against the connection on the blocking pool, retrying on lock errors.
    async fn run_blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            Self::with_retry(operation, || {
                let guard = conn
                    .lock()
                    .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
                f(&guard)
            })
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Migration(format!("failed to acquire lock: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < SCHEMA_VERSION {
            info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running settings database migrations"
            );
            Self::run_migrations(&mut conn, current_version)?;
        }

        Ok(())
    }

    /// Apply pending migrations, each in its own transaction together with
    /// its `schema_version` row.
    fn run_migrations(conn: &mut Connection, from_version: i32) -> Result<()> {
        if from_version < 1 {
            let tx = conn.transaction()?;
            Self::migration_v1(&tx)?;
            tx.execute("INSERT OR IGNORE INTO schema_version (version) VALUES (1)", [])?;
            tx.commit()?;
            info!("Migration v1 completed");
        }
        Ok(())
    }

    /// Migration to version 1: one row per tenant.
    fn migration_v1(conn: &Connection) -> Result<()> {
        debug!("Running migration v1: tenant_settings");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tenant_settings (
                tenant_id INTEGER PRIMARY KEY,
                category_id INTEGER,
                support_roles TEXT,
                log_channel_id INTEGER,
                publish_channel_id INTEGER,
                published_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// All tenants that have a settings row, in ascending id order.
    pub async fn tenants(&self) -> Result<Vec<TenantId>> {
        self.run_blocking("tenants", |conn| {
            let mut stmt =
                conn.prepare("SELECT tenant_id FROM tenant_settings ORDER BY tenant_id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids.into_iter()
                .map(|id| {
                    u64::try_from(id)
                        .map(TenantId)
                        .map_err(|_| StoreError::CorruptTenantKey(id))
                })
                .collect()
        })
        .await
    }

    /// When the tenant's row was last written.
    pub async fn last_updated(&self, tenant_id: TenantId) -> Result<Option<DateTime<Utc>>> {
        let key = encode_id(tenant_id.get())?;
        self.run_blocking("last_updated", move |conn| {
            let result = conn.query_row(
                "SELECT updated_at FROM tenant_settings WHERE tenant_id = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(ts) => parse_timestamp(tenant_id.get(), &ts).map(Some),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(StoreError::Database(e)),
            }
        })
        .await
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn upsert(&self, tenant_id: TenantId, patch: &SettingsPatch) -> Result<()> {
        let key = encode_id(tenant_id.get())?;
        let category = patch.category.map(|c| encode_id(c.get())).transpose()?;
        let log_channel = patch.log_channel.map(|c| encode_id(c.get())).transpose()?;
        let publish_channel = patch
            .publish_channel
            .map(|c| encode_id(c.get()))
            .transpose()?;
        let support_roles = patch
            .support_roles
            .as_ref()
            .map(|roles| {
                let ids: Vec<u64> = roles.iter().map(|r| r.get()).collect();
                serde_json::to_string(&ids)
            })
            .transpose()?;
        let fields = patch.field_names();

        self.run_blocking("upsert", move |conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO tenant_settings
                 (tenant_id, category_id, support_roles, log_channel_id, publish_channel_id,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(tenant_id) DO UPDATE SET
                    category_id = COALESCE(excluded.category_id, tenant_settings.category_id),
                    support_roles = COALESCE(excluded.support_roles, tenant_settings.support_roles),
                    log_channel_id = COALESCE(excluded.log_channel_id, tenant_settings.log_channel_id),
                    publish_channel_id = COALESCE(excluded.publish_channel_id, tenant_settings.publish_channel_id),
                    updated_at = excluded.updated_at",
                params![
                    key,
                    category,
                    support_roles,
                    log_channel,
                    publish_channel,
                    now
                ],
            )?;
            Ok(())
        })
        .await?;

        debug!(%tenant_id, ?fields, "Upserted tenant settings");
        Ok(())
    }

    async fn read(&self, tenant_id: TenantId) -> Result<Option<TenantSettings>> {
        let key = encode_id(tenant_id.get())?;
        let raw = self
            .run_blocking("read", move |conn| {
                let result = conn.query_row(
                    "SELECT category_id, support_roles, log_channel_id, publish_channel_id,
                            published_at
                     FROM tenant_settings WHERE tenant_id = ?1",
                    params![key],
                    |row| -> rusqlite::Result<RawRow> {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                    },
                );

                match result {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(StoreError::Database(e)),
                }
            })
            .await?;

        raw.map(|raw| decode_row(tenant_id, raw)).transpose()
    }

    async fn mark_published(&self, tenant_id: TenantId, at: DateTime<Utc>) -> Result<()> {
        let key = encode_id(tenant_id.get())?;
        self.run_blocking("mark_published", move |conn| {
            let ts = at.to_rfc3339();
            conn.execute(
                "INSERT INTO tenant_settings (tenant_id, published_at, created_at, updated_at)
                 VALUES (?1, ?2, ?2, ?2)
                 ON CONFLICT(tenant_id) DO UPDATE SET
                    published_at = excluded.published_at,
                    updated_at = excluded.updated_at",
                params![key, ts],
            )?;
            Ok(())
        })
        .await?;

        debug!(%tenant_id, "Marked entry point published");
        Ok(())
    }
}

/// SQLite integers are signed; snowflakes stay well below `i64::MAX`.
fn encode_id(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| StoreError::IdOutOfRange(id))
}

fn decode_id(tenant_id: u64, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| StoreError::CorruptRow {
        tenant_id,
        message: format!("negative identifier {}", value),
    })
}

fn parse_timestamp(tenant_id: u64, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow {
            tenant_id,
            message: format!("bad timestamp {:?}: {}", value, e),
        })
}

fn decode_row(tenant_id: TenantId, raw: RawRow) -> Result<TenantSettings> {
    let (category, roles, log_channel, publish_channel, published_at) = raw;
    let tid = tenant_id.get();

    let support_roles = match roles {
        Some(json) => {
            let ids: Vec<u64> =
                serde_json::from_str(&json).map_err(|e| StoreError::CorruptRow {
                    tenant_id: tid,
                    message: format!("support_roles: {}", e),
                })?;
            ids.into_iter().map(RoleId).collect()
        }
        None => BTreeSet::new(),
    };

    Ok(TenantSettings {
        tenant_id,
        category: category
            .map(|v| decode_id(tid, v).map(CategoryId))
            .transpose()?,
        support_roles,
        log_channel: log_channel
            .map(|v| decode_id(tid, v).map(ChannelId))
            .transpose()?,
        publish_channel: publish_channel
            .map(|v| decode_id(tid, v).map(ChannelId))
            .transpose()?,
        published_at: published_at
            .map(|ts| parse_timestamp(tid, &ts))
            .transpose()?,
    })
}
