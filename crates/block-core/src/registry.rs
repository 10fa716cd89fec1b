use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::host::{BlockHandle, HostApi};
use crate::tool::{BlockTool, BlockToolOptions, ToolboxConfig};
use crate::value::{BlockData, EditorValue};

pub type ToolConstructor = Arc<dyn Fn(BlockToolOptions) -> Box<dyn BlockTool> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool {0} does not support read-only mode")]
    ReadOnlyUnsupported(String),
}

#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub toolbox: ToolboxConfig,
    pub read_only_supported: bool,
    pub config: Option<Value>,
    pub constructor: ToolConstructor,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        toolbox: ToolboxConfig,
        constructor: impl Fn(BlockToolOptions) -> Box<dyn BlockTool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            toolbox,
            read_only_supported: false,
            config: None,
            constructor: Arc::new(constructor),
        }
    }

    pub fn read_only_supported(mut self, supported: bool) -> Self {
        self.read_only_supported = supported;
        self
    }

    pub fn config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

pub struct BlockInstance {
    pub id: String,
    pub tool: String,
    pub handle: BlockHandle,
    pub block: Box<dyn BlockTool>,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolSpec>,
}

impl ToolRegistry {
    pub fn new(specs: impl IntoIterator<Item = ToolSpec>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, spec: ToolSpec) -> Result<(), RegistryError> {
        if self.tools.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateTool(spec.name));
        }
        self.tools.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn tool(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    pub fn toolbox(&self) -> Vec<(String, ToolboxConfig)> {
        let mut entries: Vec<(String, ToolboxConfig)> = self
            .tools
            .values()
            .map(|spec| (spec.name.clone(), spec.toolbox.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn create(
        &self,
        tool: &str,
        id: impl Into<String>,
        data: Option<Value>,
        api: &HostApi,
        read_only: bool,
    ) -> Result<BlockInstance, RegistryError> {
        let spec = self
            .tools
            .get(tool)
            .ok_or_else(|| RegistryError::UnknownTool(tool.to_string()))?;
        if read_only && !spec.read_only_supported {
            return Err(RegistryError::ReadOnlyUnsupported(tool.to_string()));
        }

        let id = id.into();
        let handle = BlockHandle::new(id.clone(), tool);
        let mut options = BlockToolOptions::new(api.clone(), handle.clone()).read_only(read_only);
        options.data = data;
        options.config = spec.config.clone();

        Ok(BlockInstance {
            id,
            tool: tool.to_string(),
            handle,
            block: (spec.constructor)(options),
        })
    }

    pub fn load(
        &self,
        value: &EditorValue,
        api: &HostApi,
        read_only: bool,
    ) -> Result<Vec<BlockInstance>, RegistryError> {
        value
            .blocks
            .iter()
            .map(|block| {
                self.create(
                    &block.tool,
                    block.id.clone(),
                    Some(block.data.clone()),
                    api,
                    read_only,
                )
            })
            .collect()
    }

    /// Saves every block whose output passes its own validation.
    pub fn save(&self, blocks: &[BlockInstance]) -> EditorValue {
        let blocks = blocks
            .iter()
            .filter_map(|instance| {
                let data = instance.block.save();
                instance.block.validate(&data).then(|| BlockData {
                    id: instance.id.clone(),
                    tool: instance.tool.clone(),
                    data,
                })
            })
            .collect();
        EditorValue::from_blocks(blocks)
    }
}
