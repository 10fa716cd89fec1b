use std::sync::Arc;

use manos_block_core::{HostApi, I18n, Node, Notifier};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CardSelectConfig;
use crate::coordinator::{ItemArgs, ItemStateCoordinator};
use crate::model::{CUSTOM_LINK_TYPE, CardDocument, FILE_LINK_TYPE, ItemId, ItemRecord, ItemSeed, LinkVariant};
use crate::render::{RenderContext, render_block};
use crate::select::{NativeSelect, SelectLabels};
use crate::services::CardServices;

const LEGACY_REFERENCE_TYPE: &str = "article";

/// The ordered items of one block, bounded by `maxEntityQuantity`.
pub struct ItemCollection {
    items: Vec<ItemStateCoordinator>,
    unmounted: Vec<ItemStateCoordinator>,
    config: Arc<CardSelectConfig>,
    services: CardServices,
    notifier: Arc<dyn Notifier>,
    i18n: Arc<dyn I18n>,
    read_only: bool,
    next_id: u64,
}

impl ItemCollection {
    pub fn new(config: Arc<CardSelectConfig>, services: CardServices, api: &HostApi) -> Self {
        Self {
            items: Vec::new(),
            unmounted: Vec::new(),
            config,
            services,
            notifier: api.notifier.clone(),
            i18n: api.i18n.clone(),
            read_only: false,
            next_id: 1,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn config(&self) -> &CardSelectConfig {
        &self.config
    }

    pub fn max_items(&self) -> usize {
        self.config.max_items()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items()
    }

    pub fn items(&self) -> &[ItemStateCoordinator] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemStateCoordinator> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Appends an item, or logs a warning and does nothing at capacity.
    pub fn add_item(&mut self, variant: LinkVariant, seed: ItemSeed) -> Option<ItemId> {
        if self.is_full() {
            warn!(
                max_items = self.max_items(),
                link_type = %variant.key(),
                "entity limit reached, item not added"
            );
            return None;
        }

        let variant = self.resolve_variant(Some(variant.key()));
        let id = ItemId(self.next_id);
        self.next_id += 1;

        let mut args = ItemArgs::new(id, variant.clone(), self.services.transfer(), self.notifier.clone())
            .seed(seed)
            .read_only(self.read_only)
            .i18n(self.i18n.clone());
        if let LinkVariant::Reference(key) = &variant {
            args = args.select(Arc::new(self.build_select(key)));
            if let Some(source) = self.services.source(key) {
                args = args.options(source);
            }
        }

        let item = ItemStateCoordinator::initialize(args);
        debug!(item_id = %id, link_type = %variant.key(), "item added");
        self.unmounted.push(item.clone());
        self.items.push(item);
        Some(id)
    }

    fn build_select(&self, key: &str) -> NativeSelect {
        let defaults = SelectLabels::default();
        let search_placeholder = self
            .config
            .link_type(key)
            .map(|ty| ty.search_placeholder.clone())
            .filter(|placeholder| !placeholder.is_empty())
            .unwrap_or(defaults.search_placeholder);
        let labels = SelectLabels {
            placeholder: self.i18n.t(&defaults.placeholder),
            search_placeholder: self.i18n.t(&search_placeholder),
            loading: self.i18n.t(&defaults.loading),
            no_results: self.i18n.t(&defaults.no_results),
            error: self.i18n.t(&defaults.error),
        };
        NativeSelect::new()
            .labels(labels)
            .debounce(self.config.search_debounce())
            .min_query_len(self.config.min_query_length)
    }

    /// Removes and destroys the item; the others keep their order.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return false;
        };
        let item = self.items.remove(index);
        self.unmounted.retain(|pending| pending.id() != id);
        item.destroy();
        true
    }

    pub fn clear(&mut self) {
        for item in self.items.drain(..) {
            item.destroy();
        }
        self.unmounted.clear();
    }

    /// Items added since the last call; the host mounts them next.
    pub fn take_unmounted(&mut self) -> Vec<ItemStateCoordinator> {
        std::mem::take(&mut self.unmounted)
    }

    /// Maps a saved or requested link type onto a configured variant.
    /// Missing and legacy types become the default reference type.
    pub fn resolve_variant(&self, link_type: Option<&str>) -> LinkVariant {
        let default = || LinkVariant::reference(self.config.default_link_type());
        match link_type.map(str::trim) {
            None | Some("") | Some(LEGACY_REFERENCE_TYPE) => default(),
            Some(CUSTOM_LINK_TYPE) => LinkVariant::CustomUrl,
            Some(FILE_LINK_TYPE) => LinkVariant::File,
            Some(key) if self.config.link_type(key).is_some() => LinkVariant::reference(key),
            Some(key) => {
                warn!(link_type = key, "unknown link type, using default");
                default()
            }
        }
    }

    pub fn serialize(&self) -> CardDocument {
        CardDocument {
            items: self.items.iter().map(ItemStateCoordinator::to_record).collect(),
        }
    }

    /// Replaces the items with those in `data`. Never fails: unreadable
    /// records become empty items and a document without `items` gets one
    /// empty default item.
    pub fn deserialize(&mut self, data: &Value) {
        self.clear();

        let records = match data.get("items") {
            None | Some(Value::Null) => vec![ItemRecord::default()],
            Some(Value::Array(items)) => items.iter().map(read_record).collect(),
            Some(other) => {
                warn!(found = %json_kind(other), "items is not a list, using one empty item");
                vec![ItemRecord::default()]
            }
        };

        for record in records {
            let variant = self.resolve_variant(record.link_type.as_deref());
            let seed = ItemSeed {
                title: record.title,
                description: record.description,
                reference_id: Some(record.entity_id).filter(|id| !id.is_empty()),
                custom_url: record.custom_link,
                file: record.file,
            };
            self.add_item(variant, seed);
        }
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> Node {
        let items = self.items.iter().map(|item| item.render(ctx)).collect();
        render_block(items, ctx)
    }
}

fn read_record(value: &Value) -> ItemRecord {
    match serde_json::from_value(value.clone()) {
        Ok(record) => record,
        Err(err) => {
            warn!(error = %err, "unreadable item record, using an empty item");
            ItemRecord::default()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
