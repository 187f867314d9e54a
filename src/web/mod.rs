//! Web framework integration surface.
//!
//! This module provides the boundary between HTTP frameworks and the guards:
//! - Introducing taint at the boundary (every request value → `Tainted<String>`)
//! - Request-ID propagation into logs and the guard trail
//! - Reference handlers for the guarded routes
//!
//! # Integration Model
//!
//! Framework-specific code should:
//! 1. Build a `RequestAdapter` from its request type (decoded values)
//! 2. Call `.extract_tainted_inputs()`
//! 3. Pass the inputs to the matching `GuardedRoutes` handler
//! 4. Translate the returned `RouteResponse` into its own response type
//!
//! No module here depends on a particular framework.

mod adapter;
mod extract;
mod response;
mod routes;

pub use adapter::{RequestAdapter, TaintedInputs};
pub use extract::ExtractTaintedInputs;
pub use response::{ContentType, RouteResponse};
pub use routes::{GuardedRoutes, BEERS_TABLE, BRAND_CHECK_URL};
