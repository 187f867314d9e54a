//! Request adapter for mapping HTTP requests to tainted route inputs.

use std::collections::HashMap;

use crate::Tainted;

use super::ExtractTaintedInputs;

/// Framework-neutral holder for the parts of a request routes read.
///
/// Framework integrations fill it from their own request type (decoded
/// query string, router path parameters, body) and hand
/// [`TaintedInputs`] to the routes.
///
/// # Examples
///
/// ```
/// use input_guard::web::{ExtractTaintedInputs, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-12345");
/// adapter.add_query_param("picture", "logo.png");
/// adapter.add_path_param("brand", "Duvel");
///
/// let inputs = adapter.extract_tainted_inputs();
/// assert_eq!(inputs.request_id(), "req-12345");
/// assert!(inputs.query_params().contains_key("picture"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    /// Unique request identifier
    request_id: String,
    /// Query parameters from URL (all tainted)
    query_params: HashMap<String, String>,
    /// Path parameters from routing (all tainted)
    path_params: HashMap<String, String>,
    /// Raw request body (tainted)
    body: Option<String>,
}

impl RequestAdapter {
    /// Creates a new request adapter with the given request ID.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }

    /// Adds a decoded query parameter. A repeated key keeps the last value.
    pub fn add_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query_params.insert(key.into(), value.into());
    }

    /// Adds a decoded path parameter.
    pub fn add_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(key.into(), value.into());
    }

    /// Sets the raw request body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

fn taint_all(map: &HashMap<String, String>) -> HashMap<String, Tainted<String>> {
    map.iter()
        .map(|(k, v)| (k.clone(), Tainted::new(v.clone())))
        .collect()
}

impl ExtractTaintedInputs for RequestAdapter {
    fn extract_tainted_inputs(&self) -> TaintedInputs {
        TaintedInputs {
            request_id: self.request_id.clone(),
            query_params: taint_all(&self.query_params),
            path_params: taint_all(&self.path_params),
            body: Tainted::new(self.body.clone().unwrap_or_default()),
        }
    }
}

/// Collection of tainted inputs extracted from an HTTP request.
///
/// Every value is a [`Tainted<String>`]. A parameter the client did not send
/// reads as an empty tainted string, which every guard rejects.
#[derive(Debug, Clone)]
pub struct TaintedInputs {
    request_id: String,
    query_params: HashMap<String, Tainted<String>>,
    path_params: HashMap<String, Tainted<String>>,
    body: Tainted<String>,
}

impl TaintedInputs {
    /// Request identifier for logs and audit events.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Named query parameter, empty if absent.
    pub fn query(&self, name: &str) -> Tainted<String> {
        self.query_params.get(name).cloned().unwrap_or_else(empty)
    }

    /// Named path parameter, empty if absent.
    pub fn path(&self, name: &str) -> Tainted<String> {
        self.path_params.get(name).cloned().unwrap_or_else(empty)
    }

    /// Request body, empty if absent.
    pub fn body(&self) -> Tainted<String> {
        self.body.clone()
    }

    /// Returns a reference to the tainted query parameters.
    pub fn query_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.query_params
    }

    /// Returns a reference to the tainted path parameters.
    pub fn path_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.path_params
    }
}

fn empty() -> Tainted<String> {
    Tainted::new(String::new())
}
