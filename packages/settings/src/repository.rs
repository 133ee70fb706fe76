// ABOUTME: Settings repository over a transactional session factory
// ABOUTME: Single, multi and full-set reads and writes with value conversion at the boundary

use async_trait::async_trait;
use dynamic_settings_core::{ConversionError, ConverterRegistry, Setting, SettingValue};
use dynamic_settings_storage::{SessionFactory, SettingsSession};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};
use crate::types::SettingsMap;
use crate::validation::{validate_setting_name, validate_setting_names};

/// Read and write named settings as native values.
///
/// Every operation runs in its own session: writes are committed once,
/// after all of them succeeded, or not at all.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Value of exactly one setting. Fails with `NotFound` when absent.
    async fn get_one(&self, key: &str) -> SettingsResult<SettingValue>;

    /// Insert or overwrite one setting
    async fn set_one(&self, key: &str, value: SettingValue) -> SettingsResult<()>;

    /// Values of the requested settings; names that do not exist are left out
    async fn get_many(&self, keys: &[&str]) -> SettingsResult<SettingsMap>;

    /// Insert or overwrite every given setting, leaving others untouched
    async fn set_many(&self, settings: &SettingsMap) -> SettingsResult<()>;

    async fn get_all(&self) -> SettingsResult<SettingsMap>;

    /// Replace the whole stored set with `settings`. Settings not in the
    /// map are deleted.
    async fn set_all(&self, settings: &SettingsMap) -> SettingsResult<()>;
}

/// [`SettingsRepository`] backed by any [`SessionFactory`].
///
/// The converter registry and the session factory can both be swapped at
/// runtime. Each operation works on a snapshot of the registry taken when
/// it starts, so a swap only affects operations started afterwards.
///
/// No isolation is added on top of the store: concurrent `set_all` and
/// `get_all` calls interleave however the store's transactions allow.
pub struct DbSettingsRepository {
    session_factory: RwLock<Arc<dyn SessionFactory>>,
    converters: RwLock<ConverterRegistry>,
}

impl std::fmt::Debug for DbSettingsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettingsRepository")
            .field("converters", &self.converters())
            .finish_non_exhaustive()
    }
}

impl DbSettingsRepository {
    pub fn new(session_factory: Arc<dyn SessionFactory>, converters: ConverterRegistry) -> Self {
        debug!(
            "Creating settings repository with {} converters",
            converters.len()
        );
        Self {
            session_factory: RwLock::new(session_factory),
            converters: RwLock::new(converters),
        }
    }

    pub fn set_session_factory(&self, session_factory: Arc<dyn SessionFactory>) {
        debug!("Session factory replaced");
        *self
            .session_factory
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session_factory;
    }

    /// Replace the whole converter list
    pub fn set_converters(&self, converters: ConverterRegistry) {
        debug!("Set {} converters", converters.len());
        *self
            .converters
            .write()
            .unwrap_or_else(PoisonError::into_inner) = converters;
    }

    /// Snapshot of the active converters
    pub fn converters(&self) -> ConverterRegistry {
        self.converters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// [`get_one`](SettingsRepository::get_one) converted to a concrete type
    pub async fn get_as<T>(&self, key: &str) -> SettingsResult<T>
    where
        T: TryFrom<SettingValue, Error = ConversionError>,
    {
        let value = self.get_one(key).await?;
        T::try_from(value).map_err(|err| match err {
            ConversionError::TypeMismatch { expected, actual } => SettingsError::UnexpectedType {
                name: key.to_string(),
                expected,
                actual,
            },
            other => other.into(),
        })
    }

    fn session_factory(&self) -> Arc<dyn SessionFactory> {
        Arc::clone(
            &self
                .session_factory
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    async fn open_session(&self) -> SettingsResult<Box<dyn SettingsSession>> {
        let factory = self.session_factory();
        Ok(factory.open().await?)
    }

    fn encode_all(
        registry: &ConverterRegistry,
        settings: &SettingsMap,
    ) -> SettingsResult<Vec<Setting>> {
        debug!("Converting {} settings to storage format", settings.len());
        validate_setting_names(settings.keys().map(String::as_str))?;

        let converted = settings
            .iter()
            .map(|(name, value)| registry.encode(name, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(converted)
    }

    fn decode_all(
        registry: &ConverterRegistry,
        settings: Vec<Setting>,
    ) -> SettingsResult<SettingsMap> {
        debug!("Converting {} settings to native values", settings.len());
        let mut converted = SettingsMap::new();
        for setting in settings {
            let value = registry.decode(&setting)?;
            converted.insert(setting.name, value);
        }
        Ok(converted)
    }
}

#[async_trait]
impl SettingsRepository for DbSettingsRepository {
    async fn get_one(&self, key: &str) -> SettingsResult<SettingValue> {
        debug!("Requested setting {}", key);
        validate_setting_name(key)?;
        let registry = self.converters();

        let mut records = {
            let mut session = self.open_session().await?;
            session.fetch_by_name(key).await?
        };

        if records.len() > 1 {
            return Err(SettingsError::IntegrityViolation {
                name: key.to_string(),
                count: records.len(),
            });
        }

        let setting = records
            .pop()
            .ok_or_else(|| SettingsError::NotFound(key.to_string()))?;

        Ok(registry.decode(&setting)?)
    }

    async fn set_one(&self, key: &str, value: SettingValue) -> SettingsResult<()> {
        debug!("Setting {} is set to a {} value", key, value.native_type());
        validate_setting_name(key)?;
        let setting = self.converters().encode(key, &value)?;

        let mut session = self.open_session().await?;
        session.merge(&setting).await?;
        session.commit().await?;

        Ok(())
    }

    async fn get_many(&self, keys: &[&str]) -> SettingsResult<SettingsMap> {
        debug!("Requested settings: {:?}", keys);
        validate_setting_names(keys.iter().copied())?;
        if keys.is_empty() {
            return Ok(SettingsMap::new());
        }
        let registry = self.converters();

        let names: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let records = {
            let mut session = self.open_session().await?;
            session.fetch_by_names(&names).await?
        };

        Self::decode_all(&registry, records)
    }

    async fn set_many(&self, settings: &SettingsMap) -> SettingsResult<()> {
        debug!("Set {} settings requested", settings.len());
        let converted = Self::encode_all(&self.converters(), settings)?;
        if converted.is_empty() {
            return Ok(());
        }

        let mut session = self.open_session().await?;
        for setting in &converted {
            session.merge(setting).await?;
        }
        session.commit().await?;

        Ok(())
    }

    async fn get_all(&self) -> SettingsResult<SettingsMap> {
        debug!("All settings requested");
        let registry = self.converters();

        let records = {
            let mut session = self.open_session().await?;
            session.fetch_all().await?
        };

        Self::decode_all(&registry, records)
    }

    async fn set_all(&self, settings: &SettingsMap) -> SettingsResult<()> {
        debug!("Replacing all settings with {} entries", settings.len());
        let converted = Self::encode_all(&self.converters(), settings)?;

        let mut session = self.open_session().await?;
        let deleted = session.delete_all().await?;
        debug!("Deleted {} existing settings", deleted);
        for setting in &converted {
            session.merge(setting).await?;
        }
        session.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use dynamic_settings_core::{IntegerConverter, LookupKey, NativeType, SettingConverter};
    use dynamic_settings_storage::{StorageError, StorageResult};
    use mockall::{mock, Sequence};

    mock! {
        Session {}

        #[async_trait]
        impl SettingsSession for Session {
            async fn fetch_by_name(&mut self, name: &str) -> StorageResult<Vec<Setting>>;
            async fn fetch_by_names(&mut self, names: &[String]) -> StorageResult<Vec<Setting>>;
            async fn fetch_all(&mut self) -> StorageResult<Vec<Setting>>;
            async fn merge(&mut self, setting: &Setting) -> StorageResult<()>;
            async fn delete_all(&mut self) -> StorageResult<u64>;
            async fn commit(&mut self) -> StorageResult<()>;
        }
    }

    mock! {
        Factory {}

        #[async_trait]
        impl SessionFactory for Factory {
            async fn open(&self) -> StorageResult<Box<dyn SettingsSession>>;
        }
    }

    fn factory_for(session: MockSession) -> Arc<dyn SessionFactory> {
        let mut factory = MockFactory::new();
        factory
            .expect_open()
            .times(1)
            .return_once(move || Ok(Box::new(session) as Box<dyn SettingsSession>));
        Arc::new(factory)
    }

    fn unused_factory() -> Arc<dyn SessionFactory> {
        let mut factory = MockFactory::new();
        factory.expect_open().never();
        Arc::new(factory)
    }

    fn repository_with(session: MockSession) -> DbSettingsRepository {
        DbSettingsRepository::new(factory_for(session), ConverterRegistry::with_defaults())
    }

    fn five_settings() -> SettingsMap {
        ["a", "b", "c", "d", "e"]
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), SettingValue::Integer(i as i64)))
            .collect()
    }

    #[tokio::test]
    async fn test_set_many_failure_on_third_merge_never_commits() {
        let mut session = MockSession::new();
        session.expect_merge().times(3).returning(|setting| {
            if setting.name == "c" {
                Err(StorageError::Database("disk full".to_string()))
            } else {
                Ok(())
            }
        });
        session.expect_commit().never();

        let repository = repository_with(session);
        let result = repository.set_many(&five_settings()).await;

        match result {
            Err(SettingsError::Store(StorageError::Database(msg))) => assert_eq!(msg, "disk full"),
            other => panic!("Expected Store error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_many_commits_once_after_all_merges() {
        let mut seq = Sequence::new();
        let mut session = MockSession::new();
        session
            .expect_merge()
            .times(5)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        session
            .expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let repository = repository_with(session);
        repository.set_many(&five_settings()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unconvertible_value_never_opens_a_session() {
        let converters: Vec<Arc<dyn SettingConverter>> = vec![Arc::new(IntegerConverter)];
        let repository =
            DbSettingsRepository::new(unused_factory(), ConverterRegistry::new(converters));

        let mut settings = five_settings();
        settings.insert("name".to_string(), SettingValue::from("text"));

        match repository.set_many(&settings).await {
            Err(SettingsError::ConverterNotFound(LookupKey::NativeType(ty))) => {
                assert_eq!(ty, NativeType::Text)
            }
            other => panic!("Expected ConverterNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_all_deletes_before_merging() {
        let mut seq = Sequence::new();
        let mut session = MockSession::new();
        session
            .expect_delete_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(7));
        session
            .expect_merge()
            .times(5)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        session
            .expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let repository = repository_with(session);
        repository.set_all(&five_settings()).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_all_with_empty_map_still_clears_store() {
        let mut session = MockSession::new();
        session.expect_delete_all().times(1).returning(|| Ok(3));
        session.expect_merge().never();
        session.expect_commit().times(1).returning(|| Ok(()));

        let repository = repository_with(session);
        repository.set_all(&SettingsMap::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_one_with_duplicate_records_is_integrity_violation() {
        let mut session = MockSession::new();
        session
            .expect_fetch_by_name()
            .withf(|name| name == "dup")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Setting::new("dup", "int", "1"),
                    Setting::new("dup", "int", "2"),
                ])
            });

        let repository = repository_with(session);
        match repository.get_one("dup").await {
            Err(SettingsError::IntegrityViolation { name, count }) => {
                assert_eq!(name, "dup");
                assert_eq!(count, 2);
            }
            other => panic!("Expected IntegrityViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_one_missing_is_not_found() {
        let mut session = MockSession::new();
        session
            .expect_fetch_by_name()
            .times(1)
            .returning(|_| Ok(vec![]));

        let repository = repository_with(session);
        assert!(matches!(
            repository.get_one("missing").await,
            Err(SettingsError::NotFound(name)) if name == "missing"
        ));
    }

    #[tokio::test]
    async fn test_get_all_propagates_store_error() {
        let mut session = MockSession::new();
        session
            .expect_fetch_all()
            .times(1)
            .returning(|| Err(StorageError::SessionClosed));

        let repository = repository_with(session);
        assert!(matches!(
            repository.get_all().await,
            Err(SettingsError::Store(StorageError::SessionClosed))
        ));
    }

    #[tokio::test]
    async fn test_open_failure_propagates() {
        let mut factory = MockFactory::new();
        factory
            .expect_open()
            .times(1)
            .returning(|| Err(StorageError::Database("unreachable".to_string())));
        let repository =
            DbSettingsRepository::new(Arc::new(factory), ConverterRegistry::with_defaults());

        assert!(matches!(
            repository.set_one("a", SettingValue::Integer(1)).await,
            Err(SettingsError::Store(StorageError::Database(_)))
        ));
    }

    #[tokio::test]
    async fn test_invalid_keys_never_reach_the_store() {
        let repository =
            DbSettingsRepository::new(unused_factory(), ConverterRegistry::with_defaults());

        assert!(matches!(
            repository.get_one("").await,
            Err(SettingsError::InvalidKey(ValidationError::EmptyName))
        ));
        assert!(matches!(
            repository.set_one("", SettingValue::Integer(1)).await,
            Err(SettingsError::InvalidKey(ValidationError::EmptyName))
        ));
        assert!(matches!(
            repository.get_many(&["ok", ""]).await,
            Err(SettingsError::InvalidKey(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn test_empty_requests_skip_the_store() {
        let repository =
            DbSettingsRepository::new(unused_factory(), ConverterRegistry::with_defaults());

        assert!(repository.get_many(&[]).await.unwrap().is_empty());
        repository.set_many(&SettingsMap::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_many_passes_requested_names() {
        let mut session = MockSession::new();
        session
            .expect_fetch_by_names()
            .withf(|names| names.to_vec() == vec!["a".to_string(), "missing".to_string()])
            .times(1)
            .returning(|_| Ok(vec![Setting::new("a", "int", "1")]));

        let repository = repository_with(session);
        let found = repository.get_many(&["a", "missing"]).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found.get("a"), Some(&SettingValue::Integer(1)));
    }

    #[tokio::test]
    async fn test_swapped_converters_apply_to_next_operation() {
        let mut session = MockSession::new();
        session
            .expect_fetch_by_name()
            .times(1)
            .returning(|_| Ok(vec![Setting::new("n", "int", "5")]));

        let repository = repository_with(session);
        repository.set_converters(ConverterRegistry::default());

        assert!(matches!(
            repository.get_one("n").await,
            Err(SettingsError::ConverterNotFound(LookupKey::StorageType(tag))) if tag == "int"
        ));
    }

    #[tokio::test]
    async fn test_swapped_session_factory_is_used() {
        let mut session = MockSession::new();
        session
            .expect_fetch_all()
            .times(1)
            .returning(|| Ok(vec![Setting::new("x", "bool", "true")]));

        let repository =
            DbSettingsRepository::new(unused_factory(), ConverterRegistry::with_defaults());
        repository.set_session_factory(factory_for(session));

        let all = repository.get_all().await.unwrap();
        assert_eq!(all.get("x"), Some(&SettingValue::Boolean(true)));
    }
}
