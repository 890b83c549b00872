//! Sub-client example
//!
//! Derives a sub-client from a parent, overriding a header and one request-default
//! item, and shows that the parent is left untouched.
//!
//! Run with: RUST_LOG=debug cargo run --example sub_clients

use fluently_http::transport::{MockRoute, MockTransport};
use fluently_http::Registry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("Fluently Sub-client Example");
    println!("===========================\n");

    let mock = Arc::new(MockTransport::new());
    mock.route(MockRoute::any("https://sketch7.com/api/graphql").respond(
        "application/json",
        r#"{ "data": { "hero": { "name": "Azmodan" } } }"#,
    ));

    let registry = Registry::default();
    let parent = registry
        .create_builder("sketch7")?
        .with_base_url("https://sketch7.com")?
        .with_header("locale", "en-GB")?
        .with_request_defaults(|defaults| {
            defaults
                .with_uri("api/graphql")
                .with_item("error-mapping", "map this")
                .with_item("context", "user");
        })
        .with_transport(mock.clone())
        .build()?;

    let sub = parent
        .create_client("subclient")?
        .with_header("locale", "de")?
        .with_header("country", "de")?
        .with_request_defaults(|defaults| {
            defaults.with_item("context", "reward");
        })
        .use_timer()
        .build()?;

    for client in [&parent, &sub] {
        let request = client.create_request();
        println!("{}", client.identifier());
        println!("  Headers: {:?}", client.headers());
        println!("  Context: {:?}", request.items().get::<&str>("context"));
        println!("  Middleware: {}", client.middleware_count());
    }

    let request = sub.create_gql_request("{hero {name}}", Some("heroGet"))?;
    let response = sub.send_gql::<serde_json::Value>(request).await?;
    println!("\nGraphQL data: {:?}", response.data);

    for sent in mock.received() {
        println!("Sent {} {:?}", sent.method(), sent.url().map(|url| url.as_str()));
    }

    println!("\nRegistered: {:?}", registry.identifiers());
    Ok(())
}
