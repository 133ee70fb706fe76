// ABOUTME: Integration tests for the SQLite settings session
// ABOUTME: Upsert, lookup, bulk delete, commit and rollback-on-drop behavior

use dynamic_settings_core::Setting;
use dynamic_settings_storage::{
    SessionFactory, SqliteSessionFactory, StorageConfig, StorageError, StorageProvider,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Helper to create a migrated in-memory database for testing
async fn create_test_factory() -> SqliteSessionFactory {
    SqliteSessionFactory::connect(&StorageConfig::in_memory())
        .await
        .unwrap()
}

async fn seed(factory: &SqliteSessionFactory, settings: &[Setting]) {
    let mut session = factory.open().await.unwrap();
    for setting in settings {
        session.merge(setting).await.unwrap();
    }
    session.commit().await.unwrap();
}

async fn all(factory: &SqliteSessionFactory) -> Vec<Setting> {
    let mut session = factory.open().await.unwrap();
    session.fetch_all().await.unwrap()
}

#[tokio::test]
async fn test_merge_inserts_then_overwrites() {
    let factory = create_test_factory().await;

    seed(&factory, &[Setting::new("timeout", "int", "30")]).await;
    seed(&factory, &[Setting::new("timeout", "float", "2.5")]).await;

    assert_eq!(all(&factory).await, vec![Setting::new("timeout", "float", "2.5")]);
}

#[tokio::test]
async fn test_fetch_by_name() {
    let factory = create_test_factory().await;
    seed(
        &factory,
        &[
            Setting::new("a", "str", "alpha"),
            Setting::new("b", "str", "beta"),
        ],
    )
    .await;

    let mut session = factory.open().await.unwrap();
    assert_eq!(
        session.fetch_by_name("b").await.unwrap(),
        vec![Setting::new("b", "str", "beta")]
    );
    assert!(session.fetch_by_name("missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_by_names_skips_unknown_and_duplicates() {
    let factory = create_test_factory().await;
    seed(
        &factory,
        &[
            Setting::new("a", "int", "1"),
            Setting::new("b", "int", "2"),
            Setting::new("c", "int", "3"),
        ],
    )
    .await;

    let mut session = factory.open().await.unwrap();
    let names = vec![
        "c".to_string(),
        "missing".to_string(),
        "a".to_string(),
        "a".to_string(),
    ];
    let mut found = session.fetch_by_names(&names).await.unwrap();
    found.sort_by(|x, y| x.name.cmp(&y.name));

    assert_eq!(
        found,
        vec![Setting::new("a", "int", "1"), Setting::new("c", "int", "3")]
    );
    assert!(session.fetch_by_names(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_by_names_beyond_one_query() {
    let factory = create_test_factory().await;
    let settings: Vec<Setting> = (0..1200)
        .map(|i| Setting::new(format!("key_{:04}", i), "int", i.to_string()))
        .collect();
    seed(&factory, &settings).await;

    let names: Vec<String> = settings.iter().map(|s| s.name.clone()).collect();
    let mut session = factory.open().await.unwrap();
    let found = session.fetch_by_names(&names).await.unwrap();

    assert_eq!(found.len(), 1200);
}

#[tokio::test]
async fn test_delete_all_reports_count() {
    let factory = create_test_factory().await;
    seed(
        &factory,
        &[Setting::new("a", "int", "1"), Setting::new("b", "int", "2")],
    )
    .await;

    let mut session = factory.open().await.unwrap();
    assert_eq!(session.delete_all().await.unwrap(), 2);
    session.commit().await.unwrap();

    assert!(all(&factory).await.is_empty());
}

#[tokio::test]
async fn test_dropped_session_rolls_back() {
    let factory = create_test_factory().await;
    seed(&factory, &[Setting::new("keep", "str", "original")]).await;

    {
        let mut session = factory.open().await.unwrap();
        session.delete_all().await.unwrap();
        session
            .merge(&Setting::new("new", "str", "uncommitted"))
            .await
            .unwrap();
        // dropped here without commit
    }

    assert_eq!(
        all(&factory).await,
        vec![Setting::new("keep", "str", "original")]
    );
}

#[tokio::test]
async fn test_session_unusable_after_commit() {
    let factory = create_test_factory().await;

    let mut session = factory.open().await.unwrap();
    session.commit().await.unwrap();

    assert!(matches!(
        session.commit().await,
        Err(StorageError::SessionClosed)
    ));
    assert!(matches!(
        session.fetch_all().await,
        Err(StorageError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_file_database_persists_across_pools() {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig {
        provider: StorageProvider::Sqlite {
            path: temp_dir.path().join("nested").join("settings.db"),
        },
        max_connections: 2,
        ..StorageConfig::default()
    };

    {
        let factory = SqliteSessionFactory::connect(&config).await.unwrap();
        seed(&factory, &[Setting::new("persisted", "bool", "true")]).await;
        factory.pool().close().await;
    }

    let factory = SqliteSessionFactory::connect(&config).await.unwrap();
    assert_eq!(
        all(&factory).await,
        vec![Setting::new("persisted", "bool", "true")]
    );
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let factory = create_test_factory().await;
    factory.migrate().await.unwrap();
    factory.migrate().await.unwrap();
    assert!(all(&factory).await.is_empty());
}
