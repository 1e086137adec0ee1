//! Deterministic cache keys for API requests.

use serde_json::{Map, Value};

/// Build a cache key from an endpoint and its query parameters.
///
/// Parameters are sorted by name and rendered as `name=<json>` pairs joined
/// with `&`, so the key does not depend on the order the parameters were
/// inserted in. No parameters (or an empty map) yields the bare endpoint.
///
/// ```ignore
/// let params = json!({ "page": 2, "level": "B2" });
/// assert_eq!(
///   build_key("/exercises", params.as_object()),
///   r#"/exercises?level="B2"&page=2"#,
/// );
/// ```
pub fn build_key(endpoint: &str, params: Option<&Map<String, Value>>) -> String {
  let Some(params) = params.filter(|p| !p.is_empty()) else {
    return endpoint.to_string();
  };

  let mut pairs: Vec<(&String, &Value)> = params.iter().collect();
  pairs.sort_by(|a, b| a.0.cmp(b.0));

  let query = pairs
    .into_iter()
    .map(|(name, value)| format!("{}={}", name, value))
    .collect::<Vec<_>>()
    .join("&");

  format!("{}?{}", endpoint, query)
}
