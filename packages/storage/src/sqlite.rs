// ABOUTME: SQLite implementation of the settings session traits
// ABOUTME: Pool setup, embedded migrations and transaction-scoped record access

use async_trait::async_trait;
use dynamic_settings_core::Setting;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, Transaction};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{StorageConfig, StorageProvider};
use crate::session::{SessionFactory, SettingsSession};
use crate::{StorageError, StorageResult};

/// Names bound per `IN (...)` query, well below SQLite's parameter limit
const NAMES_PER_QUERY: usize = 500;

/// Hands out one SQLite transaction per repository operation
#[derive(Debug, Clone)]
pub struct SqliteSessionFactory {
    pool: SqlitePool,
}

impl SqliteSessionFactory {
    /// Wrap an existing pool. The `settings` table must already exist; call
    /// [`migrate`](Self::migrate) otherwise.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and create if needed) the database described by `config`
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        config.validate()?;
        let timeout = Duration::from_secs(config.busy_timeout_seconds);

        let (options, pool_options) = match &config.provider {
            StorageProvider::Sqlite { path } => {
                // Ensure parent directory exists
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }

                info!("Opening settings database at: {}", path.display());
                let mut options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                if config.enable_wal {
                    options = options.journal_mode(SqliteJournalMode::Wal);
                }

                let pool_options =
                    SqlitePoolOptions::new().max_connections(config.max_connections);
                (options, pool_options)
            }
            StorageProvider::Memory => {
                info!("Opening in-memory settings database");
                let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

                // The database lives only as long as its connection, so keep
                // exactly one open for the lifetime of the pool
                let pool_options = SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None::<Duration>)
                    .max_lifetime(None::<Duration>);
                (options, pool_options)
            }
        };

        let options = options
            .busy_timeout(timeout)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal);

        let pool = pool_options
            .acquire_timeout(timeout)
            .connect_with(options)
            .await?;

        let factory = Self::new(pool);
        if config.run_migrations {
            factory.migrate().await?;
        }

        Ok(factory)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> StorageResult<()> {
        debug!("Running settings migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SessionFactory for SqliteSessionFactory {
    async fn open(&self) -> StorageResult<Box<dyn SettingsSession>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteSession { tx: Some(tx) }))
    }
}

/// A single SQLite transaction. Rolled back on drop unless committed.
pub struct SqliteSession {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteSession {
    fn conn(&mut self) -> StorageResult<&mut SqliteConnection> {
        self.tx.as_deref_mut().ok_or(StorageError::SessionClosed)
    }

    fn row_to_setting(row: &SqliteRow) -> StorageResult<Setting> {
        Ok(Setting {
            name: row.try_get("name")?,
            type_name: row.try_get("type")?,
            value: row.try_get("value")?,
        })
    }

    fn rows_to_settings(rows: &[SqliteRow]) -> StorageResult<Vec<Setting>> {
        rows.iter().map(Self::row_to_setting).collect()
    }
}

#[async_trait]
impl SettingsSession for SqliteSession {
    async fn fetch_by_name(&mut self, name: &str) -> StorageResult<Vec<Setting>> {
        let rows = sqlx::query("SELECT name, type, value FROM settings WHERE name = ?")
            .bind(name)
            .fetch_all(self.conn()?)
            .await?;

        Self::rows_to_settings(&rows)
    }

    async fn fetch_by_names(&mut self, names: &[String]) -> StorageResult<Vec<Setting>> {
        let unique: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let conn = self.conn()?;
        let mut settings = Vec::with_capacity(unique.len());

        for chunk in unique.chunks(NAMES_PER_QUERY) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT name, type, value FROM settings WHERE name IN (");
            {
                let mut separated = builder.separated(", ");
                for name in chunk {
                    separated.push_bind(*name);
                }
                separated.push_unseparated(")");
            }

            let rows = builder.build().fetch_all(&mut *conn).await?;
            settings.extend(Self::rows_to_settings(&rows)?);
        }

        Ok(settings)
    }

    async fn fetch_all(&mut self) -> StorageResult<Vec<Setting>> {
        let rows = sqlx::query("SELECT name, type, value FROM settings ORDER BY name")
            .fetch_all(self.conn()?)
            .await?;

        Self::rows_to_settings(&rows)
    }

    async fn merge(&mut self, setting: &Setting) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (name, type, value)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                type = excluded.type,
                value = excluded.value
            "#,
        )
        .bind(&setting.name)
        .bind(&setting.type_name)
        .bind(&setting.value)
        .execute(self.conn()?)
        .await?;

        Ok(())
    }

    async fn delete_all(&mut self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM settings")
            .execute(self.conn()?)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> StorageResult<()> {
        let tx = self.tx.take().ok_or(StorageError::SessionClosed)?;
        tx.commit().await?;
        Ok(())
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        if self.tx.is_some() {
            debug!("Settings session dropped without commit, rolling back");
        }
    }
}
