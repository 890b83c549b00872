//! End-to-end sends through the `reqwest` transport against a local mockito server.

use fluently_http::{FluentError, Registry};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct Hero {
    name: String,
    title: String,
}

#[tokio::test]
async fn test_get_with_inherited_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/heroes/azmodan")
        .match_header("locale", "de")
        .match_header("user-agent", "fluently")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{ "name": "Azmodan", "title": "Lord of Sin" }"#)
        .create_async()
        .await;

    let registry = Registry::default();
    let parent = registry
        .create_builder("sketch7")
        .unwrap()
        .with_base_url(&server.url())
        .unwrap()
        .with_header("locale", "en-GB")
        .unwrap()
        .build()
        .unwrap();
    let sub = parent
        .create_client("subclient")
        .unwrap()
        .with_header("locale", "de")
        .unwrap()
        .build()
        .unwrap();

    let hero: Hero = sub.get("/api/heroes/azmodan").await.unwrap();
    assert_eq!(hero.title, "Lord of Sin");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/heroes")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(json!({
            "name": "Azmodan",
            "title": "Lord of Sin"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "name": "Azmodan", "title": "Lord of Sin" }"#)
        .create_async()
        .await;

    let registry = Registry::default();
    let client = registry
        .create_builder("sketch7")
        .unwrap()
        .with_base_url(&server.url())
        .unwrap()
        .build()
        .unwrap();

    let hero = Hero {
        name: "Azmodan".into(),
        title: "Lord of Sin".into(),
    };
    let created: Hero = client.post("/api/heroes", &hero).await.unwrap();
    assert_eq!(created, hero);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/heroes/unknown")
        .with_status(404)
        .with_body("hero not found")
        .create_async()
        .await;

    let registry = Registry::default();
    let client = registry
        .create_builder("sketch7")
        .unwrap()
        .with_base_url(&server.url())
        .unwrap()
        .build()
        .unwrap();

    let err = client
        .get::<serde_json::Value>("/api/heroes/unknown")
        .await
        .unwrap_err();
    match err {
        FluentError::RequestFailed { status, body } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, "hero not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_query_and_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/heroes")
        .match_query(mockito::Matcher::UrlEncoded("role".into(), "assassin".into()))
        .match_header("authorization", "Bearer s3cr3t")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let registry = Registry::default();
    let client = registry
        .create_builder("sketch7")
        .unwrap()
        .with_base_url(&server.url())
        .unwrap()
        .with_bearer_authentication("s3cr3t")
        .unwrap()
        .build()
        .unwrap();

    let request = client
        .create_request()
        .with_uri("api/heroes")
        .with_query("role", "assassin");
    let heroes: Vec<Hero> = client.send_as(request).await.unwrap();
    assert!(heroes.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_removed_client_rejects_sends() {
    let server = mockito::Server::new_async().await;

    let registry = Registry::default();
    let client = registry
        .create_builder("sketch7")
        .unwrap()
        .with_base_url(&server.url())
        .unwrap()
        .build()
        .unwrap();
    registry.remove("sketch7").unwrap();

    let err = client
        .get::<serde_json::Value>("/api/heroes")
        .await
        .unwrap_err();
    assert!(matches!(err, FluentError::Disposed(_)));
}
