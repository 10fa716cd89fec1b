use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "/blog/ajax-blog-list";
pub const DEFAULT_ENDPOINT_ONE: &str = "/blog/ajax-blog-by-id";
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "/upload/file";
pub const DEFAULT_RENAME_ENDPOINT: &str = "/upload/rename";
pub const DEFAULT_LINK_TYPE: &str = "blog";
pub const DEFAULT_MAX_ITEMS: usize = 3;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 2;

/// One entity type an item can reference, with its own search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default = "LinkTypeConfig::blank")]
pub struct LinkTypeConfig {
    pub key: String,
    pub button_label: String,
    pub endpoint: String,
    pub endpoint_one: String,
    pub icon: String,
    pub color: String,
    pub search_placeholder: String,
}

impl Default for LinkTypeConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_LINK_TYPE.to_string(),
            button_label: "Blog article".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            endpoint_one: DEFAULT_ENDPOINT_ONE.to_string(),
            icon: "📄".to_string(),
            color: "#007acc".to_string(),
            search_placeholder: "Search articles...".to_string(),
        }
    }
}

impl LinkTypeConfig {
    pub fn new(key: impl Into<String>, button_label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            button_label: button_label.into(),
            endpoint: String::new(),
            endpoint_one: String::new(),
            icon: String::new(),
            color: String::new(),
            search_placeholder: String::new(),
        }
    }

    fn blank() -> Self {
        Self::new("", "")
    }

    pub fn endpoints(mut self, endpoint: impl Into<String>, endpoint_one: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self.endpoint_one = endpoint_one.into();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardSelectConfig {
    pub endpoint: String,
    pub endpoint_one: String,
    /// `None` when the host left it out; an explicit 0 is kept.
    pub max_entity_quantity: Option<usize>,
    pub title_placeholder: String,
    pub description_placeholder: String,
    pub additional_request_data: BTreeMap<String, Value>,
    pub additional_request_headers: BTreeMap<String, String>,
    pub configurable_types: Vec<LinkTypeConfig>,
    pub upload_endpoint: String,
    pub rename_endpoint: String,
    pub base_url: Option<String>,
    pub search_debounce_ms: u64,
    pub min_query_length: usize,
}

impl Default for CardSelectConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            endpoint_one: String::new(),
            max_entity_quantity: None,
            title_placeholder: String::new(),
            description_placeholder: String::new(),
            additional_request_data: BTreeMap::new(),
            additional_request_headers: BTreeMap::new(),
            configurable_types: Vec::new(),
            upload_endpoint: String::new(),
            rename_endpoint: String::new(),
            base_url: None,
            search_debounce_ms: 0,
            min_query_length: 0,
        }
    }
}

impl CardSelectConfig {
    /// Parses the host's tool config. Anything unreadable falls back to the
    /// defaults with a warning.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::default().with_defaults(),
            Some(value) => match Self::try_from_json(value) {
                Ok(config) => config,
                Err(err) => {
                    warn!(error = %err, "card-select config ignored");
                    Self::default().with_defaults()
                }
            },
        }
    }

    pub fn try_from_json(value: &Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value.clone())?;
        Ok(config.with_defaults())
    }

    pub fn with_defaults(mut self) -> Self {
        if self.endpoint.is_empty() {
            self.endpoint = DEFAULT_ENDPOINT.to_string();
        }
        if self.endpoint_one.is_empty() {
            self.endpoint_one = DEFAULT_ENDPOINT_ONE.to_string();
        }
        if self.max_entity_quantity.is_none() {
            self.max_entity_quantity = Some(DEFAULT_MAX_ITEMS);
        }
        if self.title_placeholder.is_empty() {
            self.title_placeholder = "Title".to_string();
        }
        if self.description_placeholder.is_empty() {
            self.description_placeholder = "Description".to_string();
        }
        if self.upload_endpoint.is_empty() {
            self.upload_endpoint = DEFAULT_UPLOAD_ENDPOINT.to_string();
        }
        if self.rename_endpoint.is_empty() {
            self.rename_endpoint = DEFAULT_RENAME_ENDPOINT.to_string();
        }
        if self.search_debounce_ms == 0 {
            self.search_debounce_ms = DEFAULT_DEBOUNCE_MS;
        }
        if self.min_query_length == 0 {
            self.min_query_length = DEFAULT_MIN_QUERY_LENGTH;
        }

        self.configurable_types.retain(|ty| !ty.key.trim().is_empty());
        if self.configurable_types.is_empty() {
            self.configurable_types.push(LinkTypeConfig {
                endpoint: self.endpoint.clone(),
                endpoint_one: self.endpoint_one.clone(),
                ..LinkTypeConfig::default()
            });
        }
        for ty in &mut self.configurable_types {
            if ty.endpoint.is_empty() {
                ty.endpoint = self.endpoint.clone();
            }
            if ty.endpoint_one.is_empty() {
                ty.endpoint_one = self.endpoint_one.clone();
            }
            if ty.button_label.is_empty() {
                ty.button_label = ty.key.clone();
            }
            if ty.icon.is_empty() {
                ty.icon = "📄".to_string();
            }
        }
        self
    }

    /// The canonical reference key: legacy and missing link types map here.
    pub fn default_link_type(&self) -> &str {
        self.configurable_types
            .first()
            .map(|ty| ty.key.as_str())
            .unwrap_or(DEFAULT_LINK_TYPE)
    }

    pub fn max_items(&self) -> usize {
        self.max_entity_quantity.unwrap_or(DEFAULT_MAX_ITEMS)
    }

    pub fn link_type(&self, key: &str) -> Option<&LinkTypeConfig> {
        self.configurable_types.iter().find(|ty| ty.key == key)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
