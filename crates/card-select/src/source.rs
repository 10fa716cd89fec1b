use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::LinkTypeConfig;
use crate::error::RemoteError;
use crate::request::{RequestContext, X_REQUESTED_WITH};
use crate::select::SelectOption;

/// Search and fetch-by-id for one configured entity type.
#[async_trait]
pub trait RemoteOptionSource: Send + Sync {
    /// The list shown before the author types anything.
    async fn default_options(&self) -> Result<Vec<SelectOption>, RemoteError>;

    async fn search(&self, query: &str) -> Result<Vec<SelectOption>, RemoteError>;

    /// `Ok(None)` when the server does not know the id.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<SelectOption>, RemoteError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Results {
        #[serde(default)]
        results: Vec<SelectOption>,
    },
    Bare(Vec<SelectOption>),
}

#[derive(Deserialize)]
struct FetchOneResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<SelectOption>,
}

#[derive(Clone)]
pub struct HttpOptionSource {
    client: Client,
    context: RequestContext,
    endpoint: String,
    endpoint_one: String,
}

impl HttpOptionSource {
    pub fn new(
        client: Client,
        context: RequestContext,
        endpoint: impl Into<String>,
        endpoint_one: impl Into<String>,
    ) -> Self {
        Self {
            client,
            context,
            endpoint: endpoint.into(),
            endpoint_one: endpoint_one.into(),
        }
    }

    pub fn for_type(client: Client, context: RequestContext, link_type: &LinkTypeConfig) -> Self {
        Self::new(
            client,
            context,
            link_type.endpoint.clone(),
            link_type.endpoint_one.clone(),
        )
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, RemoteError> {
        let url = self.context.url(endpoint)?;
        let response = self
            .client
            .get(url)
            .headers(self.context.headers.clone())
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
            .query(params)
            .query(&self.context.extra_params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        Ok(response.text().await?)
    }

    async fn list(&self, params: &[(&str, &str)]) -> Result<Vec<SelectOption>, RemoteError> {
        let body = self.get(&self.endpoint, params).await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        let options = match parsed {
            SearchResponse::Results { results } => results,
            SearchResponse::Bare(options) => options,
        };
        debug!(endpoint = %self.endpoint, count = options.len(), "options loaded");
        Ok(options)
    }
}

#[async_trait]
impl RemoteOptionSource for HttpOptionSource {
    async fn default_options(&self) -> Result<Vec<SelectOption>, RemoteError> {
        self.list(&[]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<SelectOption>, RemoteError> {
        self.list(&[("q", query)]).await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<SelectOption>, RemoteError> {
        let body = self.get(&self.endpoint_one, &[("id", id)]).await?;
        let parsed: FetchOneResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        if !parsed.success {
            return Ok(None);
        }
        Ok(parsed.data.filter(|option| !option.id.is_empty()))
    }
}
