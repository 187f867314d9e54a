//! Extraction boundary trait for web integration.

use super::TaintedInputs;

/// Extracts tainted inputs from a framework-specific request.
///
/// All extracted inputs MUST be wrapped in `Tainted<T>`; routes only ever see
/// request data through a guard.
///
/// # Examples
///
/// ```
/// use input_guard::web::{ExtractTaintedInputs, RequestAdapter, TaintedInputs};
/// use std::collections::HashMap;
///
/// struct MyFrameworkRequest {
///     id: String,
///     query: HashMap<String, String>,
/// }
///
/// impl ExtractTaintedInputs for MyFrameworkRequest {
///     fn extract_tainted_inputs(&self) -> TaintedInputs {
///         let mut adapter = RequestAdapter::new(self.id.clone());
///         for (k, v) in &self.query {
///             adapter.add_query_param(k.clone(), v.clone());
///         }
///         adapter.extract_tainted_inputs()
///     }
/// }
/// ```
pub trait ExtractTaintedInputs {
    /// Extracts all untrusted inputs from the request.
    fn extract_tainted_inputs(&self) -> TaintedInputs;
}
