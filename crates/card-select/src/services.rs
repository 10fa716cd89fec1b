use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;

use crate::config::CardSelectConfig;
use crate::csrf::CsrfTokenProvider;
use crate::request::RequestContext;
use crate::source::{HttpOptionSource, RemoteOptionSource};
use crate::transfer::{FileTransferAgent, HttpFileTransfer};

/// Remote collaborators shared by every item of a block: one option source
/// per configured link type and one file transfer agent.
#[derive(Clone)]
pub struct CardServices {
    sources: HashMap<String, Arc<dyn RemoteOptionSource>>,
    transfer: Arc<dyn FileTransferAgent>,
}

impl CardServices {
    pub fn new(transfer: Arc<dyn FileTransferAgent>) -> Self {
        Self {
            sources: HashMap::new(),
            transfer,
        }
    }

    pub fn with_source(mut self, key: impl Into<String>, source: Arc<dyn RemoteOptionSource>) -> Self {
        self.sources.insert(key.into(), source);
        self
    }

    /// HTTP-backed services for every link type in `config`.
    pub fn http(
        client: Client,
        config: &CardSelectConfig,
        csrf: Arc<dyn CsrfTokenProvider>,
    ) -> Self {
        let context = RequestContext::from_config(config);
        let transfer = HttpFileTransfer::new(
            client.clone(),
            context.clone(),
            config.upload_endpoint.clone(),
            config.rename_endpoint.clone(),
            csrf,
        );
        config
            .configurable_types
            .iter()
            .fold(Self::new(Arc::new(transfer)), |services, ty| {
                let source = HttpOptionSource::for_type(client.clone(), context.clone(), ty);
                services.with_source(ty.key.clone(), Arc::new(source))
            })
    }

    pub fn source(&self, key: &str) -> Option<Arc<dyn RemoteOptionSource>> {
        self.sources.get(key).cloned()
    }

    pub fn transfer(&self) -> Arc<dyn FileTransferAgent> {
        self.transfer.clone()
    }
}
