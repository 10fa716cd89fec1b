use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use manos_block_core::{
    BlockHandle, BlockTool, BlockToolOptions, HostApi, MenuItem, Node, ToolSpec, ToolboxConfig,
};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::collection::ItemCollection;
use crate::config::CardSelectConfig;
use crate::coordinator::ItemStateCoordinator;
use crate::csrf::CsrfTokenProvider;
use crate::icons::{ICON_FILE, ICON_LINK, ICON_TOOLBOX};
use crate::model::{ItemId, ItemSeed, LinkVariant};
use crate::render::RenderContext;
use crate::services::CardServices;

pub const TOOL_NAME: &str = "cardWithSelect";

struct ToolInner {
    api: HostApi,
    block: BlockHandle,
    config: Arc<CardSelectConfig>,
    read_only: bool,
    collection: Mutex<ItemCollection>,
}

/// Block tool holding up to `maxEntityQuantity` linked cards.
#[derive(Clone)]
pub struct CardWithSelectTool {
    inner: Arc<ToolInner>,
}

impl CardWithSelectTool {
    pub fn new(
        options: BlockToolOptions,
        services: impl FnOnce(&CardSelectConfig) -> CardServices,
    ) -> Self {
        let config = Arc::new(CardSelectConfig::from_json(options.config.as_ref()));
        let mut collection = ItemCollection::new(config.clone(), services(&config), &options.api)
            .read_only(options.read_only);
        collection.deserialize(options.data.as_ref().unwrap_or(&Value::Null));

        Self {
            inner: Arc::new(ToolInner {
                api: options.api,
                block: options.block,
                config,
                read_only: options.read_only,
                collection: Mutex::new(collection),
            }),
        }
    }

    pub fn toolbox() -> ToolboxConfig {
        ToolboxConfig {
            icon: ICON_TOOLBOX.to_string(),
            title: "Card with links".to_string(),
        }
    }

    /// Registers the tool with services built from each block's config.
    pub fn spec(
        services: impl Fn(&CardSelectConfig) -> CardServices + Send + Sync + 'static,
    ) -> ToolSpec {
        let services = Arc::new(services);
        ToolSpec::new(TOOL_NAME, Self::toolbox(), move |options| {
            let services = services.clone();
            Box::new(Self::new(options, move |config| services(config))) as Box<dyn BlockTool>
        })
        .read_only_supported(true)
    }

    pub fn http_spec(client: Client, csrf: Arc<dyn CsrfTokenProvider>) -> ToolSpec {
        Self::spec(move |config| CardServices::http(client.clone(), config, csrf.clone()))
    }

    pub fn config(&self) -> &CardSelectConfig {
        &self.inner.config
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    pub fn len(&self) -> usize {
        self.inner.collection.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.collection.lock().is_empty()
    }

    pub fn items(&self) -> Vec<ItemStateCoordinator> {
        self.inner.collection.lock().items().to_vec()
    }

    pub fn item(&self, id: ItemId) -> Option<ItemStateCoordinator> {
        self.inner.collection.lock().item(id).cloned()
    }

    pub fn add_item(&self, variant: LinkVariant, seed: ItemSeed) -> Option<ItemId> {
        if self.inner.read_only {
            warn!(link_type = %variant.key(), "cannot add items in read-only mode");
            return None;
        }
        let added = self.inner.collection.lock().add_item(variant, seed);
        if added.is_some() {
            self.inner.block.dispatch_change();
        }
        added
    }

    pub fn remove_item(&self, id: ItemId) -> bool {
        if self.inner.read_only {
            return false;
        }
        let removed = self.inner.collection.lock().remove_item(id);
        if removed {
            self.inner.block.dispatch_change();
        }
        removed
    }

    /// Runs the after-mount step of every item not mounted yet.
    pub fn mount_pending(&self) -> BoxFuture<'static, ()> {
        let pending = self.inner.collection.lock().take_unmounted();
        debug!(count = pending.len(), "mounting items");
        Box::pin(async move {
            join_all(pending.iter().map(|item| item.after_mount())).await;
        })
    }

    fn add_entry(&self, variant: LinkVariant, label: &str, icon: &str, full: bool) -> MenuItem {
        let weak = Arc::downgrade(&self.inner);
        MenuItem::new(self.inner.api.t(label), move || {
            if let Some(inner) = weak.upgrade() {
                CardWithSelectTool { inner }.add_item(variant.clone(), ItemSeed::default());
            }
        })
        .icon(icon)
        .disabled(full)
    }
}

impl BlockTool for CardWithSelectTool {
    fn render(&self) -> Node {
        let collection = self.inner.collection.lock();
        let ctx = RenderContext {
            styles: &self.inner.api.styles,
            i18n: self.inner.api.i18n.as_ref(),
            config: &self.inner.config,
            read_only: self.inner.read_only,
        };
        collection.render(&ctx)
    }

    fn save(&self) -> Value {
        self.inner.collection.lock().serialize().to_value()
    }

    fn render_settings(&self) -> Vec<MenuItem> {
        if self.inner.read_only {
            return Vec::new();
        }
        let full = self.inner.collection.lock().is_full();

        let mut entries: Vec<MenuItem> = self
            .inner
            .config
            .configurable_types
            .iter()
            .map(|ty| {
                self.add_entry(
                    LinkVariant::reference(ty.key.clone()),
                    &ty.button_label,
                    &ty.icon,
                    full,
                )
            })
            .collect();
        entries.push(self.add_entry(LinkVariant::CustomUrl, "Custom link", ICON_LINK, full));
        entries.push(self.add_entry(LinkVariant::File, "File", ICON_FILE, full));
        entries
    }

    fn rendered(&self) -> BoxFuture<'static, ()> {
        self.mount_pending()
    }

    fn destroy(&self) {
        self.inner.collection.lock().clear();
    }
}
