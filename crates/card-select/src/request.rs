use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde_json::Value;
use tracing::warn;

use crate::config::CardSelectConfig;
use crate::error::RemoteError;

pub const X_REQUESTED_WITH: &str = "X-Requested-With";
pub const X_CSRF_TOKEN: &str = "X-CSRF-Token";

/// Base URL, extra headers and extra parameters shared by every request a
/// block makes.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub base_url: Option<Url>,
    pub headers: HeaderMap,
    pub extra_params: Vec<(String, String)>,
}

impl RequestContext {
    pub fn from_config(config: &CardSelectConfig) -> Self {
        let base_url = config.base_url.as_deref().and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(base_url = raw, error = %err, "ignoring invalid base url");
                None
            }
        });

        let mut headers = HeaderMap::new();
        for (name, value) in &config.additional_request_headers {
            let parsed = HeaderName::try_from(name.as_str())
                .ok()
                .zip(HeaderValue::from_str(value).ok());
            match parsed {
                Some((name, value)) => {
                    headers.insert(name, value);
                }
                None => warn!(header = %name, "skipping invalid request header"),
            }
        }

        let extra_params = config
            .additional_request_data
            .iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), value))
            })
            .collect();

        Self {
            base_url,
            headers,
            extra_params,
        }
    }

    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Resolves an endpoint against the base URL. Absolute endpoints are used
    /// as they are.
    pub fn url(&self, endpoint: &str) -> Result<Url, RemoteError> {
        if let Ok(url) = Url::parse(endpoint) {
            return Ok(url);
        }
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| RemoteError::endpoint(endpoint, "relative endpoint without a base url"))?;
        base.join(endpoint)
            .map_err(|err| RemoteError::endpoint(endpoint, err))
    }
}
