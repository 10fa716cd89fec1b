use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::host::{BlockHandle, HostApi};
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolboxConfig {
    pub icon: String,
    pub title: String,
}

#[derive(Clone)]
pub struct MenuItem {
    pub icon: String,
    pub label: String,
    pub is_active: bool,
    pub close_on_activate: bool,
    pub disabled: bool,
    pub handler: Arc<dyn Fn() + Send + Sync>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            icon: String::new(),
            label: label.into(),
            is_active: false,
            close_on_activate: true,
            disabled: false,
            handler: Arc::new(handler),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn close_on_activate(mut self, close_on_activate: bool) -> Self {
        self.close_on_activate = close_on_activate;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Runs the handler unless the entry is disabled.
    pub fn activate(&self) -> bool {
        if self.disabled {
            return false;
        }
        (self.handler)();
        true
    }
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .field("is_active", &self.is_active)
            .field("close_on_activate", &self.close_on_activate)
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[derive(Clone)]
pub struct BlockToolOptions {
    pub data: Option<Value>,
    pub config: Option<Value>,
    pub api: HostApi,
    pub block: BlockHandle,
    pub read_only: bool,
}

impl BlockToolOptions {
    pub fn new(api: HostApi, block: BlockHandle) -> Self {
        Self {
            data: None,
            config: None,
            api,
            block,
            read_only: false,
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// The surface a block tool exposes to the host editor.
pub trait BlockTool: Send + Sync {
    fn render(&self) -> Node;

    fn save(&self) -> Value;

    fn validate(&self, _data: &Value) -> bool {
        true
    }

    fn render_settings(&self) -> Vec<MenuItem> {
        Vec::new()
    }

    /// Called by the host once the rendered tree is attached.
    fn rendered(&self) -> BoxFuture<'static, ()> {
        Box::pin(async {})
    }

    fn destroy(&self) {}
}
