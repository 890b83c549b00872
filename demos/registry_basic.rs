//! Basic registry example
//!
//! Registers a client with shared defaults, looks it up by identifier and sends a
//! typed request through the logging and timer middleware.
//!
//! Run with: RUST_LOG=debug cargo run --example registry_basic

use fluently_http::transport::{MockRoute, MockTransport};
use fluently_http::{ClientSettings, Registry};
use http::Method;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Hero {
    name: String,
    title: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("Fluently Registry Example");
    println!("=========================\n");

    let mock = Arc::new(MockTransport::new());
    mock.route(
        MockRoute::new(Method::GET, "https://sketch7.com/api/heroes/azmodan").respond(
            "application/json",
            r#"{ "name": "Azmodan", "title": "Lord of Sin" }"#,
        ),
    );

    let registry = Registry::default();
    registry.configure_defaults(|builder| {
        builder.use_logging().use_timer();
        Ok(())
    });

    let settings: ClientSettings = serde_json::from_str(
        r#"{
            "identifier": "sketch7",
            "base_url": "https://sketch7.com",
            "timeout_secs": 10,
            "headers": { "locale": ["en-GB"] }
        }"#,
    )?;

    registry
        .create_builder_from_settings(&settings)?
        .with_transport(mock.clone())
        .build()?;
    println!("Registered clients: {:?}", registry.identifiers());

    let client = registry.get("sketch7")?;
    let hero: Hero = client.get("/api/heroes/azmodan").await?;
    println!("Fetched {} - {}", hero.name, hero.title);

    let response = client
        .send(client.create_request().with_uri("/api/heroes/unknown").with_success_check(false))
        .await?;
    println!(
        "Unknown hero answered {} in {:?}",
        response.status(),
        response.time_taken()
    );

    registry.remove("sketch7")?;
    println!("Registered clients after removal: {}", registry.count());
    println!("Transport disposed {} time(s)", mock.dispose_calls());

    Ok(())
}
