use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::blocking::Affordance;
use crate::files::file_extension;

pub const CUSTOM_LINK_TYPE: &str = "custom";
pub const FILE_LINK_TYPE: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Which affordance an item was created with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkVariant {
    /// Search-backed reference to an entity of the configured type key.
    Reference(String),
    CustomUrl,
    File,
}

impl LinkVariant {
    pub fn reference(key: impl Into<String>) -> Self {
        Self::Reference(key.into())
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Reference(key) => key,
            Self::CustomUrl => CUSTOM_LINK_TYPE,
            Self::File => FILE_LINK_TYPE,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// The one input this variant edits.
    pub fn affordance(&self) -> Affordance {
        match self {
            Self::Reference(_) => Affordance::Reference,
            Self::CustomUrl => Affordance::CustomUrl,
            Self::File => Affordance::File,
        }
    }
}

impl From<String> for LinkVariant {
    fn from(value: String) -> Self {
        match value.as_str() {
            CUSTOM_LINK_TYPE => Self::CustomUrl,
            FILE_LINK_TYPE => Self::File,
            _ => Self::Reference(value),
        }
    }
}

impl From<LinkVariant> for String {
    fn from(value: LinkVariant) -> Self {
        value.key().to_string()
    }
}

/// Metadata for an attached file. Files whose upload failed carry a local
/// preview URL and `is_local_only`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub extension: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    #[serde(
        default,
        alias = "isBlob",
        deserialize_with = "lenient::flag",
        skip_serializing_if = "is_false"
    )]
    pub is_local_only: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FileRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            extension: file_extension(&name),
            name,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Stand-in for a file the server never accepted.
    pub fn local_preview(name: impl Into<String>, size: u64) -> Self {
        let url = format!("blob:card-select/{}", uuid::Uuid::new_v4());
        let mut file = Self::new(name, url).size(size);
        file.is_local_only = true;
        file
    }

    pub fn has_server_id(&self) -> bool {
        !self.is_local_only && self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn extension_or_derived(&self) -> Option<String> {
        self.extension
            .clone()
            .filter(|ext| !ext.is_empty())
            .or_else(|| file_extension(&self.name))
    }
}

/// The single populated link of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Empty,
    Reference { type_key: String, id: String },
    CustomUrl(String),
    File(FileRef),
}

impl LinkState {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPhase {
    Empty,
    ReferenceSelected,
    CustomUrlSet,
    /// Upload placeholder shown, response not yet in.
    FileUploading,
    FileAttached,
}

/// Initial values for a new or hydrated item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSeed {
    pub title: String,
    pub description: String,
    pub reference_id: Option<String>,
    pub custom_url: Option<String>,
    pub file: Option<FileRef>,
}

impl ItemSeed {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reference_id(mut self, id: impl Into<String>) -> Self {
        self.reference_id = Some(id.into());
        self
    }

    pub fn custom_url(mut self, url: impl Into<String>) -> Self {
        self.custom_url = Some(url.into());
        self
    }

    pub fn file(mut self, file: FileRef) -> Self {
        self.file = Some(file);
        self
    }
}

/// One item as stored in the saved block data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub entity_id: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_link: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_file",
        skip_serializing_if = "Option::is_none"
    )]
    pub file: Option<FileRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDocument {
    pub items: Vec<ItemRecord>,
}

impl CardDocument {
    pub fn to_value(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(value) => value,
            Err(err) => {
                error!(error = %err, "failed to serialize card document");
                serde_json::json!({ "items": [] })
            }
        }
    }
}

/// Saved data comes from older plugin versions and hand-written fixtures,
/// so scalar fields accept numbers, strings and nulls alike.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    use super::FileRef;

    fn scalar_to_string(value: Value) -> String {
        match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.map(scalar_to_string).unwrap_or_default())
    }

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = string(deserializer)?;
        Ok((!value.is_empty()).then_some(value))
    }

    pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// `true`, `"true"`, `"1"` and non-zero numbers; anything else is false.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            _ => false,
        })
    }

    pub fn opt_file<'de, D>(deserializer: D) -> Result<Option<FileRef>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let Some(value @ Value::Object(_)) = value else {
            return Ok(None);
        };
        match serde_json::from_value::<FileRef>(value) {
            Ok(file) if !file.url.is_empty() || !file.name.is_empty() => Ok(Some(file)),
            Ok(_) => Ok(None),
            Err(err) => {
                debug!(error = %err, "dropping unreadable file record");
                Ok(None)
            }
        }
    }
}
