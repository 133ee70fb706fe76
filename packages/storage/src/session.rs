// ABOUTME: Scoped transactional session abstraction
// ABOUTME: Traits the settings repository uses to read, merge and delete records

use async_trait::async_trait;
use dynamic_settings_core::Setting;

use crate::StorageResult;

/// A transactional handle bounded to one repository operation.
///
/// Writes become visible only after [`commit`](SettingsSession::commit).
/// Dropping a session without committing discards its writes and releases
/// the underlying connection.
#[async_trait]
pub trait SettingsSession: Send {
    /// Every record whose name equals `name`
    async fn fetch_by_name(&mut self, name: &str) -> StorageResult<Vec<Setting>>;

    /// Every record whose name is in `names`; unknown names are skipped
    async fn fetch_by_names(&mut self, names: &[String]) -> StorageResult<Vec<Setting>>;

    async fn fetch_all(&mut self) -> StorageResult<Vec<Setting>>;

    /// Insert the record or overwrite the one with the same name
    async fn merge(&mut self, setting: &Setting) -> StorageResult<()>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&mut self) -> StorageResult<u64>;

    /// Make this session's writes durable. Further calls fail with
    /// `StorageError::SessionClosed`.
    async fn commit(&mut self) -> StorageResult<()>;
}

/// Produces one fresh session per repository operation.
///
/// Implementations are shared between concurrent callers.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> StorageResult<Box<dyn SettingsSession>>;
}
