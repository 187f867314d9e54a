//! Reference route handlers.
//!
//! Each handler takes the request's [`TaintedInputs`], runs the guard for
//! every value it needs, and only then touches a sink. Every guard outcome
//! goes to the request's [`GuardLog`] and to the shared [`GuardTrail`].
//! Error responses are fixed strings. The status of a rejected client input
//! always comes from [`RejectionKind::status`]; only the body is chosen per
//! route.
//!
//! | Route | Guard(s) | Errors |
//! |---|---|---|
//! | `GET /v1/beer-pic/?picture=` | file path | 400, 404 |
//! | `GET /v1/search/:filter/:query` | identifier | 400, 500 |
//! | `GET /v1/status/:brand` | token, outbound | 400, 500 |
//! | `GET /v1/redirect/?url=` | redirect | 400 |
//! | `GET /v1/test/?url=` | outbound | 400, 403 |
//! | `POST /v1/init` | JSON object check | 400 |

use std::sync::Arc;

use serde_json::{json, Value};
use url::Url;

use crate::audit::{GuardEvent, GuardTrail};
use crate::guard::{Guard, GuardResult, Guards};
use crate::logging::GuardLog;
use crate::query::BoundQuery;
use crate::sink::{FileStore, OutboundClient, QueryEngine, SinkError};
use crate::{Rejection, RejectionKind, Tainted};

use super::response::{ContentType, RouteResponse};
use super::TaintedInputs;

/// Endpoint the brand status route queries.
pub const BRAND_CHECK_URL: &str = "https://letmegooglethat.com/";

/// Table the search route reads.
pub const BEERS_TABLE: &str = "beers";

/// The guarded routes with their collaborators.
///
/// Generic over the file store, outbound client and query engine so the
/// same handlers run against real backends or in-memory ones.
#[derive(Debug)]
pub struct GuardedRoutes<F, C, Q> {
    guards: Guards,
    files: F,
    client: C,
    queries: Q,
    trail: Arc<GuardTrail>,
}

impl<F, C, Q> GuardedRoutes<F, C, Q>
where
    F: FileStore,
    C: OutboundClient,
    Q: QueryEngine,
{
    /// Wires guards to collaborators with a fresh trail.
    pub fn new(guards: Guards, files: F, client: C, queries: Q) -> Self {
        Self {
            guards,
            files,
            client,
            queries,
            trail: Arc::new(GuardTrail::new()),
        }
    }

    /// Records into a shared trail instead.
    pub fn with_trail(mut self, trail: Arc<GuardTrail>) -> Self {
        self.trail = trail;
        self
    }

    /// Guard outcomes recorded so far.
    pub fn trail(&self) -> &GuardTrail {
        &self.trail
    }

    /// The outbound client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The query engine.
    pub fn queries(&self) -> &Q {
        &self.queries
    }

    fn run_guard<G: Guard>(
        &self,
        route: &'static str,
        log: GuardLog<'_>,
        guard: &G,
        input: Tainted<String>,
    ) -> GuardResult<G::Output> {
        let digest = input.digest();
        let result = guard.check(input);
        match &result {
            Ok(_) => {
                log.accepted(G::NAME);
                self.trail
                    .record(GuardEvent::accepted(log.request_id(), route, G::NAME));
            }
            Err(rejection) => {
                log.rejected(G::NAME, rejection, &digest);
                self.trail.record(
                    GuardEvent::rejected(log.request_id(), route, G::NAME, rejection.kind())
                        .with_input_sha256(digest),
                );
            }
        }
        result
    }

    fn sink_failed(
        &self,
        route: &'static str,
        log: GuardLog<'_>,
        sink: &'static str,
        error: &SinkError,
    ) {
        log.sink_failed(sink, error);
        self.trail
            .record(GuardEvent::sink_failed(log.request_id(), route, sink));
    }

    /// `GET /v1/beer-pic/?picture=<name>`
    ///
    /// A path escape and a missing file produce the same 404.
    pub fn beer_picture(&self, inputs: &TaintedInputs) -> RouteResponse {
        const ROUTE: &str = "beer_picture";
        let log = GuardLog::new(inputs.request_id());

        let path = match self.run_guard(ROUTE, log, &self.guards.files, inputs.query("picture")) {
            Ok(path) => path,
            Err(r) => {
                let body = match r.kind() {
                    RejectionKind::DisallowedType => "Invalid file type",
                    RejectionKind::PathEscape => "File not found",
                    _ => "Invalid filename",
                };
                return reject(r, body);
            }
        };

        match self.files.read(&path) {
            Ok(data) => {
                let content_type = path
                    .as_ref()
                    .extension()
                    .map_or(ContentType::Binary, |ext| ContentType::for_extension(&ext));
                RouteResponse::bytes(content_type, data)
            }
            Err(e) => {
                self.sink_failed(ROUTE, log, "file_store", &e);
                RouteResponse::text(404, "File not found")
            }
        }
    }

    /// `GET /v1/search/:filter/:query`
    ///
    /// `filter` picks the column from the allowlist; `query` is bound as a
    /// parameter and never checked for content.
    pub fn search(&self, inputs: &TaintedInputs) -> RouteResponse {
        const ROUTE: &str = "search";
        let log = GuardLog::new(inputs.request_id());

        let column =
            match self.run_guard(ROUTE, log, &self.guards.identifiers, inputs.path("filter")) {
                Ok(column) => column,
                Err(r) => return reject(r, "Invalid filter"),
            };

        let query = BoundQuery::select_where(BEERS_TABLE, &column, inputs.path("query"));
        match self.queries.select(&query) {
            Ok(rows) => {
                let rows = rows.into_iter().map(Value::Object).collect();
                RouteResponse::json(200, &Value::Array(rows))
            }
            Err(e) => {
                self.sink_failed(ROUTE, log, "query_engine", &e);
                RouteResponse::text(500, "Query failed")
            }
        }
    }

    /// `GET /v1/status/:brand`
    ///
    /// The brand becomes the `q` parameter of a fixed lookup URL. The built
    /// URL goes through the outbound guard like any other fetch target. It is
    /// not client input, so a rejection there is a server fault and answers
    /// 500 rather than the rejection's client status.
    pub fn brand_status(&self, inputs: &TaintedInputs) -> RouteResponse {
        const ROUTE: &str = "brand_status";
        let log = GuardLog::new(inputs.request_id());

        let brand = match self.run_guard(ROUTE, log, &self.guards.tokens, inputs.path("brand")) {
            Ok(brand) => brand,
            Err(r) => return reject(r, "Invalid brand"),
        };

        let Ok(mut lookup) = Url::parse(BRAND_CHECK_URL) else {
            return RouteResponse::text(500, "Error checking brand");
        };
        lookup
            .query_pairs_mut()
            .append_pair("q", brand.as_ref().as_str());

        let Ok(target) = self.run_guard(
            ROUTE,
            log,
            &self.guards.outbound,
            Tainted::new(String::from(lookup)),
        ) else {
            return RouteResponse::text(500, "Error checking brand");
        };

        match self.client.get(&target, self.guards.outbound.timeout()) {
            Ok(_) => RouteResponse::text(200, "OK"),
            Err(e) => {
                self.sink_failed(ROUTE, log, "outbound_client", &e);
                RouteResponse::text(500, "Error checking brand")
            }
        }
    }

    /// `GET /v1/redirect/?url=<target>`
    pub fn redirect(&self, inputs: &TaintedInputs) -> RouteResponse {
        const ROUTE: &str = "redirect";
        let log = GuardLog::new(inputs.request_id());

        match self.run_guard(ROUTE, log, &self.guards.redirect, inputs.query("url")) {
            Ok(target) => RouteResponse::redirect(&target),
            Err(r) => match r.kind() {
                RejectionKind::HostNotAllowed | RejectionKind::SchemeNotAllowed => {
                    reject(r, "Invalid redirect")
                }
                _ => reject(r, "Invalid URL"),
            },
        }
    }

    /// `GET /v1/test/?url=<target>`
    ///
    /// Fetches the target and reports the upstream status as JSON. Fetch
    /// failures answer like an unusable URL.
    pub fn outbound_test(&self, inputs: &TaintedInputs) -> RouteResponse {
        const ROUTE: &str = "outbound_test";
        let log = GuardLog::new(inputs.request_id());

        let target = match self.run_guard(ROUTE, log, &self.guards.outbound, inputs.query("url")) {
            Ok(target) => target,
            Err(r) => {
                let body = match r.kind() {
                    RejectionKind::SchemeNotAllowed => "Invalid protocol",
                    RejectionKind::HostBlocked => "Forbidden host",
                    _ => "Invalid URL",
                };
                return reject(r, body);
            }
        };

        match self.client.get(&target, self.guards.outbound.timeout()) {
            Ok(status) => RouteResponse::json(200, &json!({ "status": status })),
            Err(e) => {
                self.sink_failed(ROUTE, log, "outbound_client", &e);
                RouteResponse::text(400, "Invalid URL")
            }
        }
    }

    /// `POST /v1/init`
    ///
    /// Accepts only a JSON object body. The body is parsed as plain data and
    /// nothing in it is evaluated or used to construct objects.
    pub fn init(&self, inputs: &TaintedInputs) -> RouteResponse {
        let log = GuardLog::new(inputs.request_id());
        let body = inputs.body();

        if is_json_object(&body) {
            log.info(format_args!("init payload accepted"));
            RouteResponse::json(200, &json!({ "status": "Initialized safely" }))
        } else {
            tracing::warn!(
                request_id = %log.request_id(),
                input_sha256 = %body.digest(),
                "init payload rejected"
            );
            RouteResponse::text(400, "Invalid payload")
        }
    }
}

fn reject(rejection: Rejection, body: &'static str) -> RouteResponse {
    RouteResponse::text(rejection.kind().status(), body)
}

fn is_json_object(body: &Tainted<String>) -> bool {
    serde_json::from_str::<Value>(body.peek()).is_ok_and(|v| v.is_object())
}
