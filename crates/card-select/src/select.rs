use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use manos_block_core::{ElementNode, Node, make};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{DEFAULT_DEBOUNCE_MS, DEFAULT_MIN_QUERY_LENGTH};
use crate::error::RemoteError;
use crate::model::lenient;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            selected: false,
        }
    }
}

pub type SearchHandler =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<Vec<SelectOption>, RemoteError>> + Send + Sync>;
pub type ChangeHandler = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownState {
    Options,
    Loading,
    NoResults,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A newer keystroke arrived during the debounce window.
    Debounced,
    /// A newer query finished first; this response was dropped.
    Stale,
    ShowingAll(usize),
    Results(usize),
    Failed,
}

/// A text input with a dropdown of options and a single selected value.
#[async_trait]
pub trait SearchableSelect: Send + Sync {
    fn render(&self) -> Node;

    fn set_options(&self, options: Vec<SelectOption>);

    fn options(&self) -> Vec<SelectOption>;

    fn value(&self) -> Option<String>;

    /// Selects a known option and fires the change handler. Returns false
    /// when the value is not among the options.
    fn set_value(&self, value: &str) -> bool;

    fn clear(&self);

    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    fn on_search(&self, handler: SearchHandler);

    fn on_change(&self, handler: ChangeHandler);

    /// Handles typing into the search input.
    async fn input(&self, query: String) -> SearchOutcome;

    fn destroy(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectLabels {
    pub placeholder: String,
    pub search_placeholder: String,
    pub loading: String,
    pub no_results: String,
    pub error: String,
}

impl Default for SelectLabels {
    fn default() -> Self {
        Self {
            placeholder: "Select...".to_string(),
            search_placeholder: "Search...".to_string(),
            loading: "Loading...".to_string(),
            no_results: "No results found".to_string(),
            error: "Search error".to_string(),
        }
    }
}

#[derive(Default)]
struct SelectState {
    options: Vec<SelectOption>,
    visible: Vec<SelectOption>,
    value: Option<String>,
    query: String,
    disabled: bool,
    open: bool,
    dropdown: Option<DropdownState>,
    on_search: Option<SearchHandler>,
    on_change: Option<ChangeHandler>,
    destroyed: bool,
}

impl SelectState {
    fn show(&mut self, visible: Vec<SelectOption>) -> usize {
        let count = visible.len();
        self.dropdown = Some(if count == 0 {
            DropdownState::NoResults
        } else {
            DropdownState::Options
        });
        self.visible = visible;
        count
    }

    fn find(&self, value: &str) -> Option<SelectOption> {
        self.options
            .iter()
            .chain(self.visible.iter())
            .find(|option| option.id == value)
            .cloned()
    }
}

/// Bundled dropdown: debounced search, local filtering when no search
/// handler is installed.
pub struct NativeSelect {
    state: Mutex<SelectState>,
    labels: SelectLabels,
    debounce: Duration,
    min_query_len: usize,
    latest_query: AtomicU64,
}

impl Default for NativeSelect {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeSelect {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SelectState::default()),
            labels: SelectLabels::default(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LENGTH,
            latest_query: AtomicU64::new(0),
        }
    }

    pub fn labels(mut self, labels: SelectLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn open(&self) {
        let mut state = self.state.lock();
        if state.disabled || state.destroyed {
            return;
        }
        state.open = true;
        if state.dropdown.is_none() {
            let all = state.options.clone();
            state.show(all);
        }
    }

    pub fn close(&self) {
        self.state.lock().open = false;
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn dropdown_state(&self) -> Option<DropdownState> {
        self.state.lock().dropdown.clone()
    }

    pub fn visible_options(&self) -> Vec<SelectOption> {
        self.state.lock().visible.clone()
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest_query.load(Ordering::SeqCst) == ticket
    }

    fn selected_text(state: &SelectState) -> Option<String> {
        let value = state.value.as_deref()?;
        state.find(value).map(|option| option.text)
    }
}

#[async_trait]
impl SearchableSelect for NativeSelect {
    fn render(&self) -> Node {
        let state = self.state.lock();
        let label = Self::selected_text(&state).unwrap_or_else(|| self.labels.placeholder.clone());

        let control = make("div", &["native-select__control"], [("role", json!("combobox"))])
            .child(make(
                "input",
                &["native-select__search"],
                [
                    ("type", json!("text")),
                    ("placeholder", json!(self.labels.search_placeholder)),
                    ("value", json!(state.query)),
                    ("disabled", json!(state.disabled)),
                ],
            ))
            .child(
                make("span", &["native-select__value"], [("data-value", json!(state.value))])
                    .class_if(state.value.is_none(), "native-select__value--placeholder")
                    .text(label),
            );

        let mut dropdown = make("ul", &["native-select__dropdown"], [("hidden", json!(!state.open))]);
        dropdown = match &state.dropdown {
            Some(DropdownState::Loading) => dropdown.child(
                ElementNode::new("li")
                    .class("native-select__loading")
                    .text(&self.labels.loading),
            ),
            Some(DropdownState::NoResults) => dropdown.child(
                ElementNode::new("li")
                    .class("native-select__no-results")
                    .text(&self.labels.no_results),
            ),
            Some(DropdownState::Error(_)) => dropdown.child(
                ElementNode::new("li")
                    .class("native-select__error")
                    .text(&self.labels.error),
            ),
            Some(DropdownState::Options) | None => {
                dropdown.children(state.visible.iter().map(|option| {
                    let selected = state.value.as_deref() == Some(option.id.as_str());
                    make("li", &["native-select__option"], [("data-id", json!(option.id))])
                        .class_if(selected, "native-select__option--selected")
                        .text(&option.text)
                        .build()
                }))
            }
        };

        ElementNode::new("div")
            .class("native-select")
            .class_if(state.open, "native-select-open")
            .class_if(state.disabled, "native-select-disabled")
            .child(control)
            .child(dropdown)
            .build()
    }

    fn set_options(&self, options: Vec<SelectOption>) {
        let mut state = self.state.lock();
        if let Some(selected) = options.iter().find(|option| option.selected) {
            state.value = Some(selected.id.clone());
        }
        state.options = options.clone();
        state.show(options);
    }

    fn options(&self) -> Vec<SelectOption> {
        self.state.lock().options.clone()
    }

    fn value(&self) -> Option<String> {
        self.state.lock().value.clone()
    }

    fn set_value(&self, value: &str) -> bool {
        let handler = {
            let mut state = self.state.lock();
            if state.destroyed {
                return false;
            }
            if value.is_empty() {
                state.value = None;
            } else {
                let Some(option) = state.find(value) else {
                    debug!(value, "select value not among options");
                    return false;
                };
                if !state.options.iter().any(|o| o.id == option.id) {
                    state.options.push(option);
                }
                state.value = Some(value.to_string());
            }
            let current = state.value.clone();
            for option in &mut state.options {
                option.selected = current.as_deref() == Some(option.id.as_str());
            }
            state.open = false;
            state.on_change.clone()
        };
        if let Some(handler) = handler {
            handler(value.to_string());
        }
        true
    }

    fn clear(&self) {
        self.set_value("");
    }

    fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.disabled = !enabled;
        if !enabled {
            state.open = false;
        }
    }

    fn is_enabled(&self) -> bool {
        !self.state.lock().disabled
    }

    fn on_search(&self, handler: SearchHandler) {
        self.state.lock().on_search = Some(handler);
    }

    fn on_change(&self, handler: ChangeHandler) {
        self.state.lock().on_change = Some(handler);
    }

    async fn input(&self, query: String) -> SearchOutcome {
        let ticket = self.latest_query.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().query = query.clone();

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(ticket) {
            return SearchOutcome::Debounced;
        }

        let query = query.trim().to_string();
        let handler = {
            let mut state = self.state.lock();
            if state.destroyed {
                return SearchOutcome::Stale;
            }
            state.open = !state.disabled;
            if query.chars().count() < self.min_query_len {
                let all = state.options.clone();
                return SearchOutcome::ShowingAll(state.show(all));
            }
            match state.on_search.clone() {
                Some(handler) => {
                    state.dropdown = Some(DropdownState::Loading);
                    handler
                }
                None => {
                    let needle = query.to_lowercase();
                    let matches = state
                        .options
                        .iter()
                        .filter(|option| option.text.to_lowercase().contains(&needle))
                        .cloned()
                        .collect();
                    return SearchOutcome::Results(state.show(matches));
                }
            }
        };

        let result = handler(query.clone()).await;
        let mut state = self.state.lock();
        if !self.is_current(ticket) || state.destroyed {
            debug!(query = %query, "dropping stale search response");
            return SearchOutcome::Stale;
        }
        match result {
            Ok(options) => SearchOutcome::Results(state.show(options)),
            Err(err) => {
                warn!(query = %query, error = %err, "search request failed");
                state.visible.clear();
                state.dropdown = Some(DropdownState::Error(err.to_string()));
                SearchOutcome::Failed
            }
        }
    }

    fn destroy(&self) {
        let mut state = self.state.lock();
        state.destroyed = true;
        state.open = false;
        state.on_change = None;
        state.on_search = None;
    }
}
