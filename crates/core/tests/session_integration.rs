//! End-to-end behavior of the sync session: initial binding, reactive
//! rebinding on configuration changes, and connection testing.

use std::sync::Arc;
use std::time::Duration;

use dockhand_core::{ConfigEvent, ConfigEvents, SyncConfig, SyncSession};
use dockhand_domain::{Configuration, TestConnectionOutcome};

#[path = "support.rs"]
mod support;

use support::{connection, MemoryConnectionStore, RecordingFactory};

fn config_with_active(id: &str, url: &str) -> Configuration {
    Configuration {
        connections: vec![connection(id, "prod", url)],
        active_connection_id: Some(id.to_string()),
    }
}

fn session(
    store: &Arc<MemoryConnectionStore>,
    factory: &Arc<RecordingFactory>,
    events: &ConfigEvents,
) -> SyncSession {
    SyncSession::new(
        Arc::clone(store) as _,
        Arc::clone(factory) as _,
        events.clone(),
        SyncConfig { refresh_interval: Duration::from_secs(60) },
    )
}

async fn wait_for<F>(mut predicate: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !predicate() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn start_binds_to_the_active_connection() {
    let store = MemoryConnectionStore::new(config_with_active("a", "https://one.example.com"));
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = session(&store, &factory, &events);

    session.start().await.unwrap();

    assert!(session.is_configured().await);
    assert_eq!(session.active_connection().await.unwrap().id, "a");
    assert!(session.api().await.is_some());
    // Session client plus both controllers bind through the factory.
    assert!(factory.created_urls().iter().all(|url| url == "https://one.example.com"));

    session.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn configuration_event_rebinds_to_the_new_active_connection() {
    let store = MemoryConnectionStore::new(config_with_active("a", "https://one.example.com"));
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = session(&store, &factory, &events);

    session.start().await.unwrap();

    store.set_config(config_with_active("b", "https://two.example.com")).await;
    events.emit(ConfigEvent::ActiveConnectionChanged);

    wait_for(|| {
        factory.created_urls().iter().any(|url| url == "https://two.example.com")
    })
    .await;

    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if session.active_connection().await.map(|c| c.id) == Some("b".to_string()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    session.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn losing_the_active_connection_unbinds_everything() {
    let store = MemoryConnectionStore::new(config_with_active("a", "https://one.example.com"));
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = session(&store, &factory, &events);

    session.start().await.unwrap();
    assert!(session.is_configured().await);

    store.set_config(Configuration::default()).await;
    events.emit(ConfigEvent::Cleared);

    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if !session.is_configured().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert!(session.api().await.is_none());
    let snapshot = session.applications().snapshot().await;
    assert!(!snapshot.configured);
    assert!(snapshot.data.is_empty());
    assert!(snapshot.error.is_none(), "not configured must not read as a failure");

    session.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn starting_unconfigured_is_a_valid_state() {
    let store = MemoryConnectionStore::new(Configuration::default());
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = session(&store, &factory, &events);

    session.start().await.unwrap();

    assert!(!session.is_configured().await);
    assert!(factory.created_urls().is_empty());

    session.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_folds_validation_failures() {
    let store = MemoryConnectionStore::new(Configuration::default());
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = session(&store, &factory, &events);

    let bad_url = session.test_connection("ftp://x.com", "abcdefghij").await;
    assert!(!bad_url.success);
    assert!(bad_url.error.unwrap().contains("valid URL"));

    let bad_token = session.test_connection("https://coolify.example.com", "short").await;
    assert!(!bad_token.success);
    assert!(bad_token.error.unwrap().contains("too short"));

    // Nothing reached the factory: validation rejects before any network
    // work.
    assert!(factory.created_urls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_folds_remote_failures_and_reports_success() {
    let store = MemoryConnectionStore::new(Configuration::default());
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = session(&store, &factory, &events);

    let ok = session.test_connection("https://coolify.example.com", "abcdefghij").await;
    assert!(ok.success);

    factory.set_test_outcome(TestConnectionOutcome::failed("Unauthenticated."));
    let failed = session.test_connection("https://coolify.example.com", "abcdefghij").await;
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("Unauthenticated."));
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_the_polling_loops() {
    let store = MemoryConnectionStore::new(config_with_active("a", "https://one.example.com"));
    let factory = RecordingFactory::new();
    let events = ConfigEvents::new();
    let session = SyncSession::new(
        Arc::clone(&store) as _,
        Arc::clone(&factory) as _,
        events.clone(),
        SyncConfig { refresh_interval: Duration::from_millis(20) },
    );

    session.start().await.unwrap();
    wait_for(|| factory.total_list_calls() >= 2).await;

    session.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    let settled = factory.total_list_calls();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(factory.total_list_calls(), settled, "loops must stop with the session");
}
