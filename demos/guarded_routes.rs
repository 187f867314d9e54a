//! Guarded routes demonstration.
//!
//! Sends a handful of benign and hostile requests through the guarded
//! routes and prints what each one got back. Guard decisions are logged
//! with `tracing`; set `RUST_LOG=input_guard=debug` to see acceptances too.
//!
//! Run with: `cargo run --example guarded_routes`

use std::fs;

use input_guard::web::{ExtractTaintedInputs, GuardedRoutes, RequestAdapter, RouteResponse};
use input_guard::{FsFileStore, GuardConfig, Guards, MemoryTable, RecordingClient, Row};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Simulates request-id generation
mod request_id {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(1);

    pub fn next() -> String {
        format!("req-{:08x}", COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

fn beers() -> MemoryTable {
    let rows: Vec<Row> = [
        json!({"id": 1, "name": "Duvel", "type": "ale", "price": 4}),
        json!({"id": 2, "name": "Orval", "type": "trappist", "price": 6}),
    ]
    .into_iter()
    .filter_map(|v| v.as_object().cloned())
    .collect();
    MemoryTable::new("beers", rows)
}

fn show(label: &str, resp: &RouteResponse) {
    let body = match resp.body_str() {
        Some(text) => text.to_string(),
        None => format!("<{} bytes>", resp.body().len()),
    };
    match resp.location() {
        Some(location) => println!("{label:<40} {} -> {location}", resp.status()),
        None => println!("{label:<40} {} {body}", resp.status()),
    }
}

fn request(query: &[(&str, &str)], path: &[(&str, &str)]) -> RequestAdapter {
    let mut adapter = RequestAdapter::new(request_id::next());
    for (k, v) in query {
        adapter.add_query_param(*k, *v);
    }
    for (k, v) in path {
        adapter.add_path_param(*k, *v);
    }
    adapter
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("input_guard=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let root = tempfile::tempdir()?;
    fs::write(root.path().join("logo.png"), b"\x89PNG\r\n\x1a\n")?;

    let policies = GuardConfig::with_root(root.path()).into_policies()?;
    let routes = GuardedRoutes::new(
        Guards::new(policies),
        FsFileStore,
        RecordingClient::new(200),
        beers(),
    );

    println!("=== beer-pic ===");
    for name in ["logo.png", "../../etc/passwd", "logo.svg", "missing.png"] {
        let inputs = request(&[("picture", name)], &[]).extract_tainted_inputs();
        show(name, &routes.beer_picture(&inputs));
    }

    println!("\n=== search ===");
    let searches = [
        ("type", "ale"),
        ("id; DROP TABLE beers", "1"),
        ("name", "' OR '1'='1"),
    ];
    for (filter, value) in searches {
        let inputs = request(&[], &[("filter", filter), ("query", value)]).extract_tainted_inputs();
        show(&format!("{filter} = {value}"), &routes.search(&inputs));
    }

    println!("\n=== status ===");
    for brand in ["Westmalle", "ale&q=x"] {
        let inputs = request(&[], &[("brand", brand)]).extract_tainted_inputs();
        show(brand, &routes.brand_status(&inputs));
    }

    println!("\n=== redirect ===");
    for url in [
        "https://example.com/",
        "https://example.com.evil.com/",
        "javascript://example.com/%0Aalert(1)",
    ] {
        let inputs = request(&[("url", url)], &[]).extract_tainted_inputs();
        show(url, &routes.redirect(&inputs));
    }

    println!("\n=== test ===");
    for url in [
        "https://example.com/",
        "file:///etc/passwd",
        "http://169.254.169.254/latest/meta-data",
        "http://[::1]:8080/",
    ] {
        let inputs = request(&[("url", url)], &[]).extract_tainted_inputs();
        show(url, &routes.outbound_test(&inputs));
    }

    println!("\n=== init ===");
    for body in [r#"{"name":"Duvel"}"#, "[1, 2]"] {
        let mut adapter = request(&[], &[]);
        adapter.set_body(body);
        show(body, &routes.init(&adapter.extract_tainted_inputs()));
    }

    println!("\n=== guard trail ===");
    for event in routes.trail().events() {
        println!("{event}");
    }

    Ok(())
}
