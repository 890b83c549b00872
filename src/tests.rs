//! Crate-level scenarios spanning registry, builders, clients and transports.

use crate::formatter::TextFormatter;
use crate::transport::{MockRoute, MockTransport};
use crate::{
    ClientBuilder, FluentError, Registry, Request, Response, Result, Transport,
};
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Shared observation point for [`TrackedTransport`]; the transport itself is owned
/// by the client under test.
#[derive(Default)]
struct Tracker {
    entered: Notify,
    release: Notify,
    gated: AtomicBool,
    fail_dispose: AtomicBool,
    dispose_calls: AtomicUsize,
    drops: AtomicUsize,
}

struct TrackedTransport(Arc<Tracker>);

#[async_trait]
impl Transport for TrackedTransport {
    async fn send(&self, _request: Request) -> Result<Response> {
        if self.0.gated.load(Ordering::SeqCst) {
            self.0.entered.notify_one();
            self.0.release.notified().await;
        }
        Ok(Response::new(StatusCode::OK, HeaderMap::new(), "{}"))
    }

    fn dispose(&self) -> Result<()> {
        self.0.dispose_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_dispose.load(Ordering::SeqCst) {
            return Err(FluentError::Transport("transport refused to dispose".into()));
        }
        Ok(())
    }
}

impl Drop for TrackedTransport {
    fn drop(&mut self) {
        self.0.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn tracked_builder(registry: &Registry, identifier: &str, tracker: &Arc<Tracker>) -> ClientBuilder {
    let mut builder = registry.create_builder(identifier).unwrap();
    builder
        .with_base_url("https://sketch7.com")
        .unwrap()
        .with_transport(Arc::new(TrackedTransport(tracker.clone())));
    builder
}

fn mock_builder(registry: &Registry, identifier: &str) -> ClientBuilder {
    let mut builder = registry.create_builder(identifier).unwrap();
    builder.with_transport(Arc::new(MockTransport::new()));
    builder
}

#[test]
fn test_add_then_has_and_count() {
    let registry = Registry::default();
    for (index, identifier) in ["sketch7", "heroes", "sketch7.subclient"].iter().enumerate() {
        let client = mock_builder(&registry, identifier).build_unregistered().unwrap();
        registry.add(client).unwrap();

        assert!(registry.has(identifier));
        assert_eq!(registry.count(), index + 1);
    }
}

#[test]
fn test_duplicate_add_keeps_count() {
    let registry = Registry::default();
    mock_builder(&registry, "sketch7").build().unwrap();

    let err = mock_builder(&registry, "sketch7").build().unwrap_err();
    assert!(matches!(err, FluentError::AlreadyRegistered(ref id) if id == "sketch7"));
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_remove() {
    let registry = Registry::default();
    mock_builder(&registry, "sketch7").build().unwrap();
    mock_builder(&registry, "heroes").build().unwrap();

    registry.remove("unknown").unwrap();
    assert_eq!(registry.count(), 2);

    registry.remove("sketch7").unwrap();
    assert!(!registry.has("sketch7"));
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_sub_client_header_inheritance() {
    let registry = Registry::default();
    let parent = mock_builder(&registry, "sketch7")
        .with_header("locale", "en-GB")
        .unwrap()
        .build()
        .unwrap();

    let sub = parent
        .create_client("sub")
        .unwrap()
        .with_header("locale", "de")
        .unwrap()
        .with_header("country", "de")
        .unwrap()
        .build()
        .unwrap();

    let parent_locale: Vec<_> = parent.headers().get_all("locale").iter().collect();
    assert_eq!(parent_locale, vec!["en-GB"]);
    assert!(parent.headers().get("country").is_none());

    let sub_locale: Vec<_> = sub.headers().get_all("locale").iter().collect();
    assert_eq!(sub_locale, vec!["de"]);
    assert_eq!(sub.headers()["country"], "de");
    assert_eq!(sub.headers()[http::header::USER_AGENT], "fluently");
}

#[test]
fn test_sub_client_identifier_and_registration() {
    let registry = Registry::default();
    let parent = mock_builder(&registry, "sketch7").build().unwrap();
    let sub = parent.create_client("subclient").unwrap().build().unwrap();

    assert_eq!(parent.identifier(), "sketch7");
    assert_eq!(sub.identifier(), "sketch7.subclient");
    assert_eq!(registry.count(), 2);
    assert!(registry.get("sketch7.subclient").unwrap().ptr_eq(&sub));
}

#[test]
fn test_sub_client_of_dropped_registry_is_unregistered() {
    let registry = Registry::default();
    let parent = mock_builder(&registry, "sketch7").build().unwrap();
    drop(registry);

    let sub = parent.create_client("subclient").unwrap().build().unwrap();
    assert_eq!(sub.identifier(), "sketch7.subclient");
}

#[test]
fn test_request_defaults_item_override() {
    let registry = Registry::default();
    let parent = mock_builder(&registry, "sketch7")
        .with_request_defaults(|defaults| {
            defaults
                .with_item("error-mapping", "map this")
                .with_item("context", "user");
        })
        .build()
        .unwrap();

    let sub = parent
        .create_client("subclient")
        .unwrap()
        .with_request_defaults(|defaults| {
            defaults.with_item("context", "reward");
        })
        .build()
        .unwrap();

    let parent_request = parent.create_request();
    let sub_request = sub.create_request();

    assert_eq!(parent_request.items().get::<&str>("context"), Some(&"user"));
    assert_eq!(sub_request.items().get::<&str>("context"), Some(&"reward"));
    assert_eq!(
        sub_request.items().get::<&str>("error-mapping"),
        Some(&"map this")
    );
    assert!(parent_request
        .items()
        .same_value(sub_request.items(), "error-mapping"));
}

#[test]
fn test_formatter_list_independence() {
    let registry = Registry::default();
    let parent = mock_builder(&registry, "sketch7").build().unwrap();

    let sub = parent
        .create_client("subclient")
        .unwrap()
        .configure_formatters(|formatters| {
            formatters.push(Arc::new(TextFormatter));
        })
        .build()
        .unwrap();

    assert_eq!(parent.formatters().len(), 1);
    assert_eq!(sub.formatters().len(), 2);
}

#[test]
fn test_middleware_list_independence() {
    let registry = Registry::default();
    let parent = mock_builder(&registry, "sketch7").use_timer().build().unwrap();

    let sub = parent
        .create_client("subclient")
        .unwrap()
        .use_logging()
        .build()
        .unwrap();

    assert_eq!(parent.middleware_count(), 1);
    assert_eq!(sub.middleware_count(), 2);
    assert!(Arc::ptr_eq(
        &parent.config().middleware()[0],
        &sub.config().middleware()[0]
    ));
}

#[test]
fn test_get_missing_and_identity() {
    let registry = Registry::default();
    let err = registry.get("sketch7").unwrap_err();
    assert!(matches!(err, FluentError::NotFound(ref id) if id == "sketch7"));

    let client = mock_builder(&registry, "sketch7").build_unregistered().unwrap();
    let added = registry.add(client.clone()).unwrap();
    assert!(added.ptr_eq(&client));
    assert!(registry.get("sketch7").unwrap().ptr_eq(&client));
}

#[test]
fn test_build_twice_yields_independent_clients() {
    let mut builder = ClientBuilder::new("sketch7");
    builder
        .with_header("locale", "en-GB")
        .unwrap()
        .with_transport(Arc::new(MockTransport::new()));

    let first = builder.build().unwrap();
    builder.with_header("country", "gb").unwrap().with_item("tenant", "acme");
    let second = builder.build().unwrap();

    assert!(!first.ptr_eq(&second));
    assert!(first.headers().get("country").is_none());
    assert!(first.items().is_empty());
    assert_eq!(second.headers()["country"], "gb");

    first.dispose().unwrap();
    assert!(!second.is_disposed());
}

#[test]
fn test_registered_builder_second_build_conflicts() {
    let registry = Registry::default();
    let builder = mock_builder(&registry, "sketch7");
    builder.build().unwrap();
    assert!(builder.build().unwrap_err().is_already_registered());

    registry.remove("sketch7").unwrap();
    builder.build().unwrap();
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_created_requests_unaffected_by_later_builds() {
    let registry = Registry::default();
    let mut builder = mock_builder(&registry, "sketch7");
    builder.with_request_defaults(|defaults| {
        defaults.with_item("context", "user");
    });
    let client = builder.build().unwrap();
    let request = client.create_request();

    builder.with_request_defaults(|defaults| {
        defaults.with_item("context", "changed");
    });
    builder.with_identifier("other").build().unwrap();

    assert_eq!(request.items().get::<&str>("context"), Some(&"user"));
    assert_eq!(
        client.create_request().items().get::<&str>("context"),
        Some(&"user")
    );
}

#[test]
fn test_concurrent_adds_register_once() {
    let registry = Registry::default();
    let successes = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                if mock_builder(&registry, "sketch7").build().is_ok() {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        for index in 0..8 {
            let registry = &registry;
            scope.spawn(move || {
                mock_builder(registry, &format!("client-{index}")).build().unwrap();
            });
        }
    });

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(registry.count(), 9);
}

#[test]
fn test_remove_propagates_disposal_failure() {
    let registry = Registry::default();
    let tracker = Arc::new(Tracker::default());
    tracker.fail_dispose.store(true, Ordering::SeqCst);
    tracked_builder(&registry, "sketch7", &tracker).build().unwrap();

    let err = registry.remove("sketch7").unwrap_err();
    assert!(matches!(err, FluentError::Transport(_)));
    assert!(!registry.has("sketch7"));
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_idle_dispose_releases_transport_once() {
    let registry = Registry::default();
    let tracker = Arc::new(Tracker::default());
    let client = tracked_builder(&registry, "sketch7", &tracker).build().unwrap();

    registry.remove("sketch7").unwrap();
    client.dispose().unwrap();
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.drops.load(Ordering::SeqCst), 0);

    drop(client);
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_remove_disposes_while_builder_alive() {
    let registry = Registry::default();
    let tracker = Arc::new(Tracker::default());
    tracker.fail_dispose.store(true, Ordering::SeqCst);
    let builder = tracked_builder(&registry, "sketch7", &tracker);
    builder.build().unwrap();

    let err = registry.remove("sketch7").unwrap_err();
    assert!(matches!(err, FluentError::Transport(_)));
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);

    drop(builder);
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_remove_disposes_while_caller_keeps_transport() {
    let registry = Registry::default();
    let mock = Arc::new(MockTransport::new());
    registry
        .create_builder("sketch7")
        .unwrap()
        .with_transport(mock.clone())
        .build()
        .unwrap();

    registry.remove("sketch7").unwrap();
    assert_eq!(mock.dispose_calls(), 1);

    mock.fail_dispose(true);
    registry
        .create_builder("heroes")
        .unwrap()
        .with_transport(mock.clone())
        .build()
        .unwrap();
    assert!(registry.remove("heroes").is_err());
    assert_eq!(mock.dispose_calls(), 2);
}

#[test]
fn test_siblings_from_one_builder_share_release() {
    let tracker = Arc::new(Tracker::default());
    let mut builder = ClientBuilder::new("sketch7");
    builder.with_transport(Arc::new(TrackedTransport(tracker.clone())));

    let first = builder.build().unwrap();
    let second = builder.build().unwrap();

    first.dispose().unwrap();
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 0);
    second.dispose().unwrap();
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_transport_released_by_last_client() {
    let registry = Registry::default();
    let tracker = Arc::new(Tracker::default());
    let parent = tracked_builder(&registry, "sketch7", &tracker).build().unwrap();
    let sub = parent.create_client("subclient").unwrap().build().unwrap();

    registry.remove("sketch7").unwrap();
    assert!(parent.is_disposed());
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 0);

    registry.remove("sketch7.subclient").unwrap();
    assert!(sub.is_disposed());
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_in_flight_request_survives_disposal() {
    let registry = Registry::default();
    let tracker = Arc::new(Tracker::default());
    tracker.gated.store(true, Ordering::SeqCst);
    let client = tracked_builder(&registry, "sketch7", &tracker).build().unwrap();

    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.send(client.create_request()).await }
    });
    tracker.entered.notified().await;

    registry.remove("sketch7").unwrap();
    assert!(client.is_disposed());
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 0);
    assert_eq!(tracker.drops.load(Ordering::SeqCst), 0);

    let err = client.send(client.create_request()).await.unwrap_err();
    assert!(matches!(err, FluentError::Disposed(_)));

    tracker.release.notify_one();
    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(tracker.dispose_calls.load(Ordering::SeqCst), 1);

    drop(client);
    assert_eq!(tracker.drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_send_times_out() {
    let registry = Registry::default();
    let tracker = Arc::new(Tracker::default());
    tracker.gated.store(true, Ordering::SeqCst);
    let client = tracked_builder(&registry, "sketch7", &tracker)
        .with_timeout(Duration::from_millis(50))
        .unwrap()
        .build()
        .unwrap();

    let err = client.send(client.create_request()).await.unwrap_err();
    assert!(matches!(err, FluentError::Timeout));
}

#[tokio::test]
async fn test_sub_client_sends_through_inherited_pipeline() {
    let mock = Arc::new(MockTransport::new());
    mock.route(
        MockRoute::new(Method::GET, "https://sketch7.com/api/heroes/azmodan")
            .respond("application/json", r#"{ "name": "Azmodan" }"#),
    );

    let registry = Registry::default();
    registry.configure_defaults(|builder| {
        builder.use_timer().with_header("x-app", "fluently")?;
        Ok(())
    });

    let parent = registry
        .create_builder("sketch7")
        .unwrap()
        .with_base_url("https://sketch7.com")
        .unwrap()
        .with_header("locale", "en-GB")
        .unwrap()
        .with_transport(mock.clone())
        .build()
        .unwrap();
    let sub = parent
        .create_client("subclient")
        .unwrap()
        .with_header("locale", "de")
        .unwrap()
        .build()
        .unwrap();

    let response = sub
        .send(sub.create_request().with_uri("api/heroes/{hero}").with_uri_param("hero", "azmodan"))
        .await
        .unwrap();
    assert!(response.time_taken().is_some());

    let sent = &mock.received()[0];
    assert_eq!(sent.headers()["locale"], "de");
    assert_eq!(sent.headers()["x-app"], "fluently");
    assert_eq!(sent.headers()[http::header::USER_AGENT], "fluently");
}

#[test]
fn test_blocking_send_with_tokio_test() {
    let mock = MockTransport::new();
    mock.route(MockRoute::any("https://sketch7.com/ping").respond("text/plain", "pong"));

    let client = ClientBuilder::new("sketch7")
        .with_base_url("https://sketch7.com")
        .unwrap()
        .configure_formatters(|formatters| {
            formatters.push(Arc::new(TextFormatter));
        })
        .with_transport(Arc::new(mock))
        .build()
        .unwrap();

    let pong: String = tokio_test::block_on(client.get("ping")).unwrap();
    assert_eq!(pong, "pong");
}
