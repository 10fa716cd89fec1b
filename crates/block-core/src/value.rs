use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_VERSION: &str = "2.30.0";

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub tool: String,
    #[serde(default)]
    pub data: Value,
}

/// Saved editor output: the ordered blocks with their tool data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    #[serde(default)]
    pub blocks: Vec<BlockData>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl EditorValue {
    pub fn from_blocks(blocks: Vec<BlockData>) -> Self {
        Self {
            time: None,
            blocks,
            version: default_version(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
