//! Shared helpers for unit tests.

use std::path::Path;

use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use crate::guard::Guards;
use crate::http::RecordingClient;
use crate::policy::{
    FilePathPolicy, GuardPolicies, IdentifierPolicy, OutboundPolicy, RedirectPolicy, TokenPolicy,
};
use crate::query::{MemoryTable, Row};
use crate::sink::FsFileStore;
use crate::web::GuardedRoutes;

/// Strings the default token pattern accepts.
pub(crate) fn arb_token(max_len: usize) -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[A-Za-z0-9-]{{1,{max_len}}}")).unwrap()
}

pub(crate) type TestRoutes = GuardedRoutes<FsFileStore, RecordingClient, MemoryTable>;

pub(crate) struct Fixture {
    root: TempDir,
    pub(crate) routes: TestRoutes,
    pub(crate) logo: Vec<u8>,
}

impl Fixture {
    /// Directory the file guard serves from.
    pub(crate) fn root(&self) -> &Path {
        self.root.path()
    }
}

pub(crate) fn beer_rows() -> Vec<Row> {
    [
        json!({"id": 1, "name": "Duvel", "type": "ale", "price": 4}),
        json!({"id": 2, "name": "Orval", "type": "trappist", "price": 6}),
    ]
    .into_iter()
    .filter_map(|v| v.as_object().cloned())
    .collect()
}

/// Routes over a temp root holding `logo.png` and `notes.txt`, with a
/// client answering `status`.
pub(crate) fn fixture(status: u16) -> Fixture {
    fixture_with_client(RecordingClient::new(status))
}

pub(crate) fn fixture_with_client(client: RecordingClient) -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let logo = b"\x89PNG\r\n\x1a\n".to_vec();
    std::fs::write(root.path().join("logo.png"), &logo).unwrap();
    std::fs::write(root.path().join("notes.txt"), b"notes").unwrap();

    let policies = GuardPolicies {
        files: FilePathPolicy::new(root.path(), [".jpg", ".jpeg", ".png"]).unwrap(),
        redirect: RedirectPolicy::new(["example.com", "letmegooglethat.com"]).unwrap(),
        outbound: OutboundPolicy::default(),
        identifiers: IdentifierPolicy::new(["id", "name", "type", "price"]).unwrap(),
        tokens: TokenPolicy::default(),
    };
    let routes = GuardedRoutes::new(
        Guards::new(policies),
        FsFileStore,
        client,
        MemoryTable::new("beers", beer_rows()),
    );

    Fixture {
        root,
        routes,
        logo,
    }
}
