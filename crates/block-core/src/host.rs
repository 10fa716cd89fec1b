use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub trait I18n: Send + Sync {
    fn t(&self, key: &str) -> String;
}

/// Returns every key untranslated.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityI18n;

impl I18n for IdentityI18n {
    fn t(&self, key: &str) -> String {
        key.to_string()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl I18n for Dictionary {
    fn t(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styles {
    pub block: String,
    pub input: String,
    pub button: String,
    pub loader: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            block: "cdx-block".to_string(),
            input: "cdx-input".to_string(),
            button: "cdx-button".to_string(),
            loader: "cdx-loader".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub ttl: Duration,
}

impl Notice {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ttl: Self::DEFAULT_TTL,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Keeps posted notices until their TTL runs out.
#[derive(Default)]
pub struct NoticeBoard {
    posted: Mutex<Vec<(Instant, Notice)>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Vec<Notice> {
        self.active_at(Instant::now())
    }

    pub fn active_at(&self, now: Instant) -> Vec<Notice> {
        let mut posted = self.posted.lock();
        posted.retain(|(at, notice)| now.saturating_duration_since(*at) < notice.ttl);
        posted.iter().map(|(_, notice)| notice.clone()).collect()
    }

    pub fn post_at(&self, at: Instant, notice: Notice) {
        self.posted.lock().push((at, notice));
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        self.post_at(Instant::now(), notice);
    }
}

#[derive(Clone)]
pub struct HostApi {
    pub i18n: Arc<dyn I18n>,
    pub styles: Styles,
    pub notifier: Arc<dyn Notifier>,
}

impl HostApi {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            i18n: Arc::new(IdentityI18n),
            styles: Styles::default(),
            notifier,
        }
    }

    pub fn with_i18n(mut self, i18n: Arc<dyn I18n>) -> Self {
        self.i18n = i18n;
        self
    }

    pub fn t(&self, key: &str) -> String {
        self.i18n.t(key)
    }
}

impl Default for HostApi {
    fn default() -> Self {
        Self::new(Arc::new(NoticeBoard::new()))
    }
}

/// The host's handle on one block instance.
#[derive(Debug, Clone)]
pub struct BlockHandle {
    pub id: String,
    pub name: String,
    changes: Arc<AtomicU64>,
}

impl BlockHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            changes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn dispatch_change(&self) {
        self.changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn change_count(&self) -> u64 {
        self.changes.load(Ordering::Relaxed)
    }
}
