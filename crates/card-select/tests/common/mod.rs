//! Fakes shared by the card-select integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use manos_block_core::{Notice, Notifier};
use manos_card_select::{
    CardServices, FileRef, FileTransferAgent, ItemArgs, ItemId, ItemSeed, ItemStateCoordinator,
    LinkVariant, LocalFile, NativeSelect, RemoteError, RemoteOptionSource, RenameRequest,
    SelectOption, with_extension,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub struct FakeSource {
    options: Vec<SelectOption>,
    entities: HashMap<String, SelectOption>,
    fail_default: bool,
    fail_fetch: bool,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new(options: &[(&str, &str)]) -> Self {
        Self {
            options: options
                .iter()
                .map(|(id, text)| SelectOption::new(*id, *text))
                .collect(),
            entities: HashMap::new(),
            fail_default: false,
            fail_fetch: false,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_entity(mut self, id: &str, text: &str) -> Self {
        self.entities
            .insert(id.to_string(), SelectOption::new(id, text));
        self
    }

    pub fn failing_default(mut self) -> Self {
        self.fail_default = true;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteOptionSource for FakeSource {
    async fn default_options(&self) -> Result<Vec<SelectOption>, RemoteError> {
        if self.fail_default {
            return Err(RemoteError::Status(StatusCode::BAD_GATEWAY));
        }
        Ok(self.options.clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<SelectOption>, RemoteError> {
        let needle = query.to_lowercase();
        Ok(self
            .options
            .iter()
            .chain(self.entities.values())
            .filter(|option| option.text.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<SelectOption>, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(RemoteError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(self
            .entities
            .get(id)
            .or_else(|| self.options.iter().find(|option| option.id == id))
            .cloned())
    }
}

#[derive(Default)]
pub struct FakeTransfer {
    fail_upload: bool,
    fail_rename: bool,
    gate: Option<Arc<Notify>>,
    uploads: AtomicUsize,
    renames: Mutex<Vec<RenameRequest>>,
}

impl FakeTransfer {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_upload: true,
            fail_rename: true,
            ..Self::default()
        }
    }

    /// Uploads wait until the returned gate is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn renames(&self) -> Vec<RenameRequest> {
        self.renames.lock().clone()
    }
}

#[async_trait]
impl FileTransferAgent for FakeTransfer {
    async fn upload(&self, file: &LocalFile) -> Result<FileRef, RemoteError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_upload {
            return Err(RemoteError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(FileRef::new(file.name.clone(), format!("/uploads/{}", file.name))
            .id("101")
            .size(file.size()))
    }

    async fn rename(&self, request: &RenameRequest) -> Result<FileRef, RemoteError> {
        self.renames.lock().push(request.clone());
        if self.fail_rename {
            return Err(RemoteError::Rejected("name taken".to_string()));
        }
        let mut file = FileRef::new(
            with_extension(&request.name, request.extension.as_deref()),
            request.url.clone(),
        )
        .id(request.id.clone());
        file.size = request.size;
        Ok(file)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .map(|notice| notice.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

pub struct Fixture {
    pub item: ItemStateCoordinator,
    pub notifier: Arc<RecordingNotifier>,
    pub select: Option<Arc<NativeSelect>>,
}

pub fn item(variant: LinkVariant, seed: ItemSeed, transfer: Arc<FakeTransfer>) -> Fixture {
    let notifier = Arc::new(RecordingNotifier::default());
    let item = ItemStateCoordinator::initialize(
        ItemArgs::new(ItemId(1), variant, transfer, notifier.clone()).seed(seed),
    );
    Fixture {
        item,
        notifier,
        select: None,
    }
}

pub fn reference_item(source: Arc<FakeSource>, seed: ItemSeed) -> Fixture {
    let notifier = Arc::new(RecordingNotifier::default());
    let select = Arc::new(NativeSelect::new().debounce(Duration::ZERO));
    let item = ItemStateCoordinator::initialize(
        ItemArgs::new(
            ItemId(1),
            LinkVariant::reference("blog"),
            Arc::new(FakeTransfer::ok()),
            notifier.clone(),
        )
        .seed(seed)
        .select(select.clone())
        .options(source),
    );
    Fixture {
        item,
        notifier,
        select: Some(select),
    }
}

pub fn services(source: FakeSource, transfer: FakeTransfer) -> CardServices {
    CardServices::new(Arc::new(transfer)).with_source("blog", Arc::new(source))
}
