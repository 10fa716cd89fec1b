use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use futures::future::BoxFuture;
use manos_block_core::{I18n, IdentityI18n, Node, Notice, Notifier};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::blocking::{
    Affordance, BLOCKED_ACTION_MESSAGE, BlockingState, LinkValues, compute_blocking_state,
};
use crate::files::{base_name, with_extension};
use crate::model::{FileRef, ItemId, ItemPhase, ItemRecord, ItemSeed, LinkState, LinkVariant};
use crate::render::{RenderContext, render_item};
use crate::select::{SearchableSelect, SelectOption};
use crate::source::RemoteOptionSource;
use crate::transfer::{FileTransferAgent, LocalFile, RenameRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Applied,
    /// Another affordance holds the value; the author was notified.
    Blocked,
    /// Read-only, destroyed, or the affordance does not exist on this item.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(FileRef),
    /// The server did not take the file; a local preview is attached instead.
    LocalOnly(FileRef),
    Blocked,
    /// The file was cleared or replaced while the upload ran.
    Ignored,
    /// The item was destroyed while the upload ran.
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    NoFile,
    Unchanged,
    RenamedLocally(FileRef),
    Renamed(FileRef),
    Failed,
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileSlot {
    #[default]
    Empty,
    Uploading {
        name: String,
        size: u64,
    },
    Attached(FileRef),
}

#[derive(Debug, Default)]
struct ItemView {
    title: String,
    description: String,
    reference: Option<String>,
    pending_reference: Option<String>,
    custom_url: String,
    file: FileSlot,
    file_name_draft: String,
    drag_over: bool,
    upload_ticket: u64,
    blocking: BlockingState,
}

impl ItemView {
    fn attached_file(&self) -> Option<&FileRef> {
        match &self.file {
            FileSlot::Attached(file) => Some(file),
            _ => None,
        }
    }

    fn reference_value(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .or(self.pending_reference.as_deref())
            .filter(|id| !id.is_empty())
    }

    fn recompute(&mut self) -> BlockingState {
        let values = LinkValues {
            reference: self.reference_value(),
            custom_url: Some(self.custom_url.as_str()),
            file: self.attached_file(),
            uploading: matches!(self.file, FileSlot::Uploading { .. }),
        };
        self.blocking = compute_blocking_state(&values);
        self.blocking
    }

    fn attach(&mut self, file: FileRef) {
        self.file_name_draft = base_name(&file.name).to_string();
        self.file = FileSlot::Attached(file);
        self.drag_over = false;
    }
}

/// Everything a rendering pass needs to know about one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub variant: LinkVariant,
    pub title: String,
    pub description: String,
    pub link: LinkState,
    pub phase: ItemPhase,
    pub blocking: BlockingState,
    pub custom_url: String,
    pub file: FileSlot,
    pub file_name_draft: String,
    pub drag_over: bool,
    pub read_only: bool,
}

/// Collaborators and initial values for one item.
pub struct ItemArgs {
    pub id: ItemId,
    pub variant: LinkVariant,
    pub seed: ItemSeed,
    pub read_only: bool,
    pub select: Option<Arc<dyn SearchableSelect>>,
    pub options: Option<Arc<dyn RemoteOptionSource>>,
    pub transfer: Arc<dyn FileTransferAgent>,
    pub notifier: Arc<dyn Notifier>,
    pub i18n: Arc<dyn I18n>,
}

impl ItemArgs {
    pub fn new(
        id: ItemId,
        variant: LinkVariant,
        transfer: Arc<dyn FileTransferAgent>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            id,
            variant,
            seed: ItemSeed::default(),
            read_only: false,
            select: None,
            options: None,
            transfer,
            notifier,
            i18n: Arc::new(IdentityI18n),
        }
    }

    pub fn seed(mut self, seed: ItemSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn select(mut self, select: Arc<dyn SearchableSelect>) -> Self {
        self.select = Some(select);
        self
    }

    pub fn options(mut self, options: Arc<dyn RemoteOptionSource>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn i18n(mut self, i18n: Arc<dyn I18n>) -> Self {
        self.i18n = i18n;
        self
    }
}

struct ItemInner {
    id: ItemId,
    variant: LinkVariant,
    read_only: bool,
    view: Mutex<ItemView>,
    alive: AtomicBool,
    mounted: AtomicBool,
    select: Option<Arc<dyn SearchableSelect>>,
    options: Option<Arc<dyn RemoteOptionSource>>,
    transfer: Arc<dyn FileTransferAgent>,
    notifier: Arc<dyn Notifier>,
    i18n: Arc<dyn I18n>,
}

/// Owns one item's link state and keeps its three affordances mutually
/// exclusive. Cloning yields another handle to the same item.
#[derive(Clone)]
pub struct ItemStateCoordinator {
    inner: Arc<ItemInner>,
}

impl ItemStateCoordinator {
    pub fn initialize(args: ItemArgs) -> Self {
        let ItemArgs {
            id,
            variant,
            seed,
            read_only,
            select,
            options,
            transfer,
            notifier,
            i18n,
        } = args;

        let mut view = ItemView {
            title: seed.title,
            description: seed.description,
            ..ItemView::default()
        };
        match &variant {
            LinkVariant::Reference(_) => {
                view.pending_reference = seed.reference_id.filter(|id| !id.is_empty());
                if seed.custom_url.is_some() || seed.file.is_some() {
                    debug!(item_id = %id, "discarding seed values for other link types");
                }
            }
            LinkVariant::CustomUrl => {
                view.custom_url = seed.custom_url.unwrap_or_default();
                if seed.reference_id.is_some() || seed.file.is_some() {
                    debug!(item_id = %id, "discarding seed values for other link types");
                }
            }
            LinkVariant::File => {
                if let Some(file) = seed.file {
                    view.attach(file);
                }
                if seed.reference_id.is_some() || seed.custom_url.is_some() {
                    debug!(item_id = %id, "discarding seed values for other link types");
                }
            }
        }
        let blocking = view.recompute();

        let select = select.filter(|_| variant.is_reference());
        let coordinator = Self {
            inner: Arc::new(ItemInner {
                id,
                variant,
                read_only,
                view: Mutex::new(view),
                alive: AtomicBool::new(true),
                mounted: AtomicBool::new(false),
                select,
                options,
                transfer,
                notifier,
                i18n,
            }),
        };
        coordinator.wire_select();
        coordinator.sync_select(blocking);
        coordinator
    }

    fn wire_select(&self) {
        let Some(select) = &self.inner.select else {
            return;
        };

        let weak: Weak<ItemInner> = Arc::downgrade(&self.inner);
        select.on_change(Arc::new(move |value: String| {
            if let Some(inner) = weak.upgrade() {
                ItemStateCoordinator { inner }.on_reference_change(&value);
            }
        }));

        if let Some(source) = &self.inner.options {
            let source = source.clone();
            select.on_search(Arc::new(move |query: String| {
                let source = source.clone();
                async move { source.search(&query).await }.boxed()
            }));
        }
    }

    fn sync_select(&self, blocking: BlockingState) {
        if let Some(select) = &self.inner.select {
            select.set_enabled(!self.inner.read_only && !blocking.reference_disabled);
        }
    }

    fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    fn accepts_input(&self) -> bool {
        self.is_alive() && !self.inner.read_only
    }

    fn owns(&self, affordance: Affordance) -> bool {
        self.inner.variant.affordance() == affordance
    }

    /// `None` when a value may be entered through `affordance`. Filling an
    /// input the variant does not own is a blocked action.
    fn refuse(&self, affordance: Affordance) -> Option<InputOutcome> {
        if !self.accepts_input() {
            return Some(InputOutcome::Ignored);
        }
        if !self.owns(affordance) {
            self.notify_blocked();
            return Some(InputOutcome::Blocked);
        }
        None
    }

    fn notify_blocked(&self) {
        self.inner
            .notifier
            .notify(Notice::transient(self.inner.i18n.t(BLOCKED_ACTION_MESSAGE)));
    }

    /// Applies `f` to the view, recomputes blocking and syncs the select.
    fn update<R>(&self, f: impl FnOnce(&mut ItemView) -> R) -> R {
        let (result, blocking) = {
            let mut view = self.inner.view.lock();
            let result = f(&mut view);
            (result, view.recompute())
        };
        self.sync_select(blocking);
        result
    }

    pub fn id(&self) -> ItemId {
        self.inner.id
    }

    pub fn variant(&self) -> &LinkVariant {
        &self.inner.variant
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    pub fn select(&self) -> Option<&Arc<dyn SearchableSelect>> {
        self.inner.select.as_ref()
    }

    /// Loads the default option list and resolves the seeded reference.
    /// Runs once, after the item is attached to the page.
    pub async fn after_mount(&self) {
        if !self.is_alive() || self.inner.mounted.swap(true, Ordering::SeqCst) {
            return;
        }
        let (Some(select), Some(source)) = (&self.inner.select, &self.inner.options) else {
            return;
        };

        match source.default_options().await {
            Ok(options) if self.is_alive() => {
                select.set_options(options.into_iter().map(unselected).collect());
            }
            Ok(_) => return,
            Err(err) => {
                warn!(item_id = %self.inner.id, link_type = %self.inner.variant.key(), error = %err, "failed to load default options");
            }
        }

        let pending = self.inner.view.lock().pending_reference.clone();
        if let Some(id) = pending {
            self.select_reference(&id).await;
        }
    }

    /// Selects the entity `id`, fetching it by id when it is not among the
    /// loaded options. Returns whether the selection took.
    pub async fn select_reference(&self, id: &str) -> bool {
        let (Some(select), Some(source)) = (&self.inner.select, &self.inner.options) else {
            return false;
        };
        if !self.is_alive() {
            return false;
        }
        if select.value().as_deref() == Some(id) {
            return true;
        }

        let known = select.options().iter().any(|option| option.id == id);
        if !known {
            match source.fetch_by_id(id).await {
                Ok(Some(option)) if self.is_alive() => {
                    let mut options = select.options();
                    options.push(unselected(option));
                    select.set_options(options);
                }
                Ok(Some(_)) => return false,
                Ok(None) => {
                    warn!(item_id = %self.inner.id, entity_id = id, "referenced entity not found");
                    self.update(|view| view.pending_reference = None);
                    return false;
                }
                Err(err) => {
                    warn!(item_id = %self.inner.id, entity_id = id, error = %err, "failed to fetch referenced entity");
                    self.update(|view| view.pending_reference = None);
                    return false;
                }
            }
        }

        // A hydrated reference is the item's own value, not an author edit.
        let hydrating = self.inner.view.lock().pending_reference.as_deref() == Some(id);
        if !self.apply_reference(id, hydrating) {
            self.notify_blocked();
            return false;
        }
        if !select.set_value(id) {
            self.update(|view| view.reference = None);
            return false;
        }
        true
    }

    fn apply_reference(&self, id: &str, hydrating: bool) -> bool {
        self.update(|view| {
            if !hydrating && view.blocking.reference_disabled {
                return false;
            }
            view.reference = Some(id.to_string());
            view.pending_reference = None;
            true
        })
    }

    pub fn on_reference_change(&self, value: &str) -> InputOutcome {
        // Read-only items still follow programmatic selection.
        if !self.is_alive() || self.inner.select.is_none() {
            return InputOutcome::Ignored;
        }

        let value = value.trim();
        if value.is_empty() {
            self.update(|view| {
                view.reference = None;
                view.pending_reference = None;
            });
            return InputOutcome::Applied;
        }

        if self.apply_reference(value, false) {
            InputOutcome::Applied
        } else {
            if let Some(select) = &self.inner.select {
                select.clear();
            }
            self.notify_blocked();
            InputOutcome::Blocked
        }
    }

    /// The select's clear button.
    pub fn on_select_clear(&self) -> InputOutcome {
        if !self.accepts_input() {
            return InputOutcome::Ignored;
        }
        match &self.inner.select {
            Some(select) => {
                select.clear();
                InputOutcome::Applied
            }
            None => InputOutcome::Ignored,
        }
    }

    pub fn on_custom_url_input(&self, value: &str) -> InputOutcome {
        if let Some(outcome) = self.refuse(Affordance::CustomUrl) {
            return outcome;
        }
        let filled = !value.trim().is_empty();
        let applied = self.update(|view| {
            if filled && view.blocking.custom_url_disabled {
                return false;
            }
            view.custom_url = value.to_string();
            true
        });
        if applied {
            InputOutcome::Applied
        } else {
            self.notify_blocked();
            InputOutcome::Blocked
        }
    }

    pub fn on_file_attached(&self, file: FileRef) -> InputOutcome {
        if let Some(outcome) = self.refuse(Affordance::File) {
            return outcome;
        }
        let applied = self.update(|view| {
            if view.blocking.file_disabled {
                return false;
            }
            view.upload_ticket += 1;
            view.attach(file);
            true
        });
        if applied {
            InputOutcome::Applied
        } else {
            self.notify_blocked();
            InputOutcome::Blocked
        }
    }

    /// Removes the file, or abandons an upload still in flight.
    pub fn on_file_cleared(&self) -> InputOutcome {
        if !self.accepts_input() || !self.owns(Affordance::File) {
            return InputOutcome::Ignored;
        }
        self.update(|view| {
            view.upload_ticket += 1;
            view.file = FileSlot::Empty;
            view.file_name_draft.clear();
        });
        InputOutcome::Applied
    }

    /// Whether a click on the file zone may open the file picker.
    pub fn on_file_zone_click(&self) -> bool {
        if self.refuse(Affordance::File).is_some() {
            return false;
        }
        if self.inner.view.lock().blocking.file_disabled {
            self.notify_blocked();
            return false;
        }
        true
    }

    pub fn on_drag_over(&self) -> bool {
        if !self.accepts_input() || !self.owns(Affordance::File) {
            return false;
        }
        let mut view = self.inner.view.lock();
        let allowed = !view.blocking.file_disabled;
        view.drag_over = allowed;
        allowed
    }

    pub fn on_drag_leave(&self) {
        self.inner.view.lock().drag_over = false;
    }

    pub fn set_title(&self, title: impl Into<String>) -> InputOutcome {
        if !self.accepts_input() {
            return InputOutcome::Ignored;
        }
        self.inner.view.lock().title = title.into();
        InputOutcome::Applied
    }

    pub fn set_description(&self, description: impl Into<String>) -> InputOutcome {
        if !self.accepts_input() {
            return InputOutcome::Ignored;
        }
        self.inner.view.lock().description = description.into();
        InputOutcome::Applied
    }

    pub fn set_file_name_draft(&self, draft: impl Into<String>) {
        self.inner.view.lock().file_name_draft = draft.into();
    }

    /// Shows the upload placeholder right away; the returned future performs
    /// the upload and never fails.
    pub fn upload_file(&self, file: LocalFile) -> BoxFuture<'static, UploadOutcome> {
        match self.refuse(Affordance::File) {
            Some(InputOutcome::Blocked) => {
                return Box::pin(futures::future::ready(UploadOutcome::Blocked));
            }
            Some(_) => return Box::pin(futures::future::ready(UploadOutcome::Ignored)),
            None => {}
        }

        let name = file.name.clone();
        let size = file.size();
        let ticket = self.update(|view| {
            if view.blocking.file_disabled {
                return None;
            }
            view.upload_ticket += 1;
            view.file = FileSlot::Uploading {
                name: name.clone(),
                size,
            };
            view.drag_over = false;
            Some(view.upload_ticket)
        });
        let Some(ticket) = ticket else {
            self.notify_blocked();
            return Box::pin(futures::future::ready(UploadOutcome::Blocked));
        };

        let item = self.clone();
        Box::pin(async move {
            let result = item.inner.transfer.upload(&file).await;
            if !item.is_alive() {
                debug!(item_id = %item.inner.id, "upload finished after item was removed");
                return UploadOutcome::Detached;
            }

            let attached = match result {
                Ok(uploaded) => UploadOutcome::Uploaded(uploaded),
                Err(err) => {
                    warn!(item_id = %item.inner.id, file = %name, error = %err, "upload failed, keeping local preview");
                    UploadOutcome::LocalOnly(FileRef::local_preview(name, size))
                }
            };

            item.update(|view| {
                let current = view.upload_ticket == ticket
                    && matches!(view.file, FileSlot::Uploading { .. });
                if !current {
                    return UploadOutcome::Ignored;
                }
                match &attached {
                    UploadOutcome::Uploaded(file) | UploadOutcome::LocalOnly(file) => {
                        view.attach(file.clone());
                    }
                    _ => {}
                }
                attached
            })
        })
    }

    /// Renames the attached file to `base` keeping its extension. Files
    /// without a server id are renamed locally only.
    pub async fn rename_file(&self, base: &str) -> RenameOutcome {
        if !self.accepts_input() {
            return RenameOutcome::Detached;
        }
        let base = base.trim();

        let request = {
            let mut view = self.inner.view.lock();
            let Some(file) = view.attached_file().cloned() else {
                return RenameOutcome::NoFile;
            };
            let current = base_name(&file.name).to_string();
            if base.is_empty() || base == current {
                view.file_name_draft = current;
                return RenameOutcome::Unchanged;
            }

            view.file_name_draft = base.to_string();
            if !file.has_server_id() {
                let mut renamed = file;
                renamed.name = with_extension(base, renamed.extension_or_derived().as_deref());
                view.file = FileSlot::Attached(renamed.clone());
                return RenameOutcome::RenamedLocally(renamed);
            }
            RenameRequest::for_file(&file, base)
        };

        let result = self.inner.transfer.rename(&request).await;
        if !self.is_alive() {
            return RenameOutcome::Detached;
        }

        let mut view = self.inner.view.lock();
        let Some(file) = view.attached_file().cloned() else {
            return RenameOutcome::Detached;
        };
        if file.id.as_deref() != Some(request.id.as_str()) {
            return RenameOutcome::Detached;
        }

        match result {
            Ok(mut updated) => {
                if updated.name.is_empty() {
                    updated.name = with_extension(base, request.extension.as_deref());
                }
                if updated.url.is_empty() {
                    updated.url = file.url.clone();
                }
                view.attach(updated.clone());
                RenameOutcome::Renamed(updated)
            }
            Err(err) => {
                error!(item_id = %self.inner.id, file_id = %request.id, error = %err, "file rename failed");
                view.file_name_draft = base_name(&file.name).to_string();
                RenameOutcome::Failed
            }
        }
    }

    pub fn compute_blocking_state(&self) -> BlockingState {
        self.inner.view.lock().recompute()
    }

    pub fn is_disabled(&self, affordance: Affordance) -> bool {
        self.inner.read_only || self.compute_blocking_state().is_disabled(affordance)
    }

    pub fn link_state(&self) -> LinkState {
        let view = self.inner.view.lock();
        self.link_state_of(&view)
    }

    fn link_state_of(&self, view: &ItemView) -> LinkState {
        match view.blocking.authoritative {
            Some(Affordance::Reference) => LinkState::Reference {
                type_key: self.inner.variant.key().to_string(),
                id: view.reference_value().unwrap_or_default().to_string(),
            },
            Some(Affordance::CustomUrl) => LinkState::CustomUrl(view.custom_url.clone()),
            Some(Affordance::File) => match view.attached_file() {
                Some(file) => LinkState::File(file.clone()),
                None => LinkState::Empty,
            },
            None => LinkState::Empty,
        }
    }

    pub fn phase(&self) -> ItemPhase {
        let view = self.inner.view.lock();
        phase_of(&view)
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        let mut view = self.inner.view.lock();
        let blocking = view.recompute();
        ItemSnapshot {
            id: self.inner.id,
            variant: self.inner.variant.clone(),
            title: view.title.clone(),
            description: view.description.clone(),
            link: self.link_state_of(&view),
            phase: phase_of(&view),
            blocking,
            custom_url: view.custom_url.clone(),
            file: view.file.clone(),
            file_name_draft: view.file_name_draft.clone(),
            drag_over: view.drag_over,
            read_only: self.inner.read_only,
        }
    }

    /// The saved form of this item. `linkType` is always the variant's key;
    /// only the value of the variant's own affordance is written.
    pub fn to_record(&self) -> ItemRecord {
        let snapshot = self.snapshot();
        let mut record = ItemRecord {
            title: snapshot.title,
            description: snapshot.description,
            link_type: Some(snapshot.variant.key().to_string()),
            ..ItemRecord::default()
        };
        match (snapshot.variant.affordance(), snapshot.link) {
            (Affordance::Reference, LinkState::Reference { id, .. }) => record.entity_id = id,
            (Affordance::CustomUrl, LinkState::CustomUrl(url)) => record.custom_link = Some(url),
            (Affordance::File, LinkState::File(file)) => record.file = Some(file),
            _ => {}
        }
        record
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> Node {
        let snapshot = self.snapshot();
        let select = self.inner.select.as_ref().map(|select| select.render());
        render_item(&snapshot, select, ctx)
    }

    pub fn is_destroyed(&self) -> bool {
        !self.is_alive()
    }

    /// Detaches the select and drops late async completions. Idempotent.
    pub fn destroy(&self) {
        if !self.inner.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(select) = &self.inner.select {
            select.destroy();
        }
        debug!(item_id = %self.inner.id, "item destroyed");
    }
}

fn phase_of(view: &ItemView) -> ItemPhase {
    match view.blocking.authoritative {
        None => ItemPhase::Empty,
        Some(Affordance::Reference) => ItemPhase::ReferenceSelected,
        Some(Affordance::CustomUrl) => ItemPhase::CustomUrlSet,
        Some(Affordance::File) => match view.file {
            FileSlot::Uploading { .. } => ItemPhase::FileUploading,
            _ => ItemPhase::FileAttached,
        },
    }
}

fn unselected(mut option: SelectOption) -> SelectOption {
    option.selected = false;
    option
}
