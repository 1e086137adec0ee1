use color_eyre::{eyre::eyre, Result};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::cache::{build_key, CacheResult, ResponseCache};
use crate::config::Config;

/// REST client for the practice backend with cached GETs.
///
/// The response cache is injected, so several clients (or a client and the
/// UI) can share one store.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  token: Option<String>,
  cache: ResponseCache<Value>,
  default_ttl: Duration,
}

impl ApiClient {
  pub fn new(config: &Config, cache: ResponseCache<Value>) -> Result<Self> {
    Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.api.base_url.trim_end_matches('/').to_string(),
      token: Config::get_api_token(),
      cache,
      default_ttl: config.cache.default_ttl(),
    })
  }

  pub fn cache(&self) -> &ResponseCache<Value> {
    &self.cache
  }

  /// Cache key for a GET, computed on the normalized endpoint.
  pub fn cache_key(&self, endpoint: &str, params: Option<&Map<String, Value>>) -> String {
    build_key(&normalize_endpoint(endpoint), params)
  }

  /// Resolve an endpoint path against the base URL.
  pub fn url(&self, endpoint: &str) -> Result<Url> {
    let joined = format!("{}{}", self.base_url, normalize_endpoint(endpoint));
    Url::parse(&joined).map_err(|e| eyre!("Invalid endpoint {}: {}", endpoint, e))
  }

  /// Cached GET with the default TTL.
  pub async fn get(
    &self,
    endpoint: &str,
    params: Option<&Map<String, Value>>,
  ) -> Result<CacheResult<Arc<Value>>> {
    self.get_with_ttl(endpoint, params, self.default_ttl).await
  }

  /// Cached GET. A cold key waits for the server; a warm one returns the
  /// cached body and refreshes it in the background.
  pub async fn get_with_ttl(
    &self,
    endpoint: &str,
    params: Option<&Map<String, Value>>,
    ttl: Duration,
  ) -> Result<CacheResult<Arc<Value>>> {
    let key = self.cache_key(endpoint, params);
    let request = self.request_json(endpoint, params)?;

    self.cache.fetch(&key, move || request, ttl).await
  }

  /// Warm the cache for a request the user is likely to make next.
  pub fn prefetch(&self, endpoint: &str, params: Option<Map<String, Value>>) {
    let key = self.cache_key(endpoint, params.as_ref());
    let request = match self.request_json(endpoint, params.as_ref()) {
      Ok(request) => request,
      Err(e) => {
        debug!(endpoint, error = %e, "prefetch skipped");
        return;
      }
    };
    let cache = self.cache.clone();
    let ttl = self.default_ttl;

    tokio::spawn(async move {
      if let Err(e) = cache.cached_fetch(&key, move || request, ttl).await {
        debug!(key = %key, error = %e, "prefetch failed");
      }
    });
  }

  /// Drop cached GETs for `endpoint` and the paths below it.
  pub fn invalidate(&self, endpoint: &str) -> usize {
    self.cache.invalidate_endpoint(&normalize_endpoint(endpoint))
  }

  /// Uncached POST. Cached reads under the same endpoint are invalidated
  /// once the server accepts the write.
  pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
    let mut request = self.http.post(self.url(endpoint)?).json(body);
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| eyre!("POST {} failed: {}", endpoint, e))?;

    self.invalidate(endpoint);

    // Some endpoints answer 204 with no body
    let bytes = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read response from {}: {}", endpoint, e))?;
    if bytes.is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
      .map_err(|e| eyre!("Failed to parse response from {}: {}", endpoint, e))
  }

  /// Build the GET future up front so it can be handed to the cache as a producer.
  fn request_json(
    &self,
    endpoint: &str,
    params: Option<&Map<String, Value>>,
  ) -> Result<impl Future<Output = Result<Value>> + Send + 'static> {
    let url = self.url(endpoint)?;
    let query = params.map(query_pairs).unwrap_or_default();
    let http = self.http.clone();
    let token = self.token.clone();
    let endpoint = normalize_endpoint(endpoint);

    Ok(async move {
      let mut request = http.get(url).query(&query);
      if let Some(token) = token {
        request = request.bearer_auth(token);
      }
      let response = request
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| eyre!("GET {} failed: {}", endpoint, e))?;

      response
        .json::<Value>()
        .await
        .map_err(|e| eyre!("Failed to parse response from {}: {}", endpoint, e))
    })
  }
}

/// One leading `/`, so `goals` and `/goals` share a URL and a cache slot.
fn normalize_endpoint(endpoint: &str) -> String {
  format!("/{}", endpoint.trim_start_matches('/'))
}

/// Query string pairs. Strings are sent bare, everything else as JSON text.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
  params
    .iter()
    .map(|(name, value)| {
      let value = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      };
      (name.clone(), value)
    })
    .collect()
}
