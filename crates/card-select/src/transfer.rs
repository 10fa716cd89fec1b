use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::csrf::CsrfTokenProvider;
use crate::error::RemoteError;
use crate::files::file_extension;
use crate::model::FileRef;
use crate::request::{RequestContext, X_CSRF_TOKEN, X_REQUESTED_WITH};

/// A file picked or dropped by the author, not yet on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub contents: Vec<u8>,
    pub content_type: Option<String>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            content_type: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn mime(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRequest {
    pub id: String,
    pub name: String,
    pub extension: Option<String>,
    pub url: String,
    pub size: Option<u64>,
}

impl RenameRequest {
    /// `name` is the new base name; the extension is carried over.
    pub fn for_file(file: &FileRef, name: impl Into<String>) -> Self {
        Self {
            id: file.id.clone().unwrap_or_default(),
            name: name.into(),
            extension: file.extension_or_derived(),
            url: file.url.clone(),
            size: file.size,
        }
    }
}

#[async_trait]
pub trait FileTransferAgent: Send + Sync {
    async fn upload(&self, file: &LocalFile) -> Result<FileRef, RemoteError>;

    async fn rename(&self, request: &RenameRequest) -> Result<FileRef, RemoteError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<FileRef>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RenameResponse {
    Envelope {
        success: bool,
        #[serde(default)]
        data: Option<FileRef>,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(FileRef),
}

#[derive(Clone)]
pub struct HttpFileTransfer {
    client: Client,
    context: RequestContext,
    upload_endpoint: String,
    rename_endpoint: String,
    csrf: Arc<dyn CsrfTokenProvider>,
}

impl HttpFileTransfer {
    pub fn new(
        client: Client,
        context: RequestContext,
        upload_endpoint: impl Into<String>,
        rename_endpoint: impl Into<String>,
        csrf: Arc<dyn CsrfTokenProvider>,
    ) -> Self {
        Self {
            client,
            context,
            upload_endpoint: upload_endpoint.into(),
            rename_endpoint: rename_endpoint.into(),
            csrf,
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .headers(self.context.headers.clone())
            .header(X_REQUESTED_WITH, "XMLHttpRequest");
        match self.csrf.token() {
            Some(token) => builder.header(X_CSRF_TOKEN, token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = self.request(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl FileTransferAgent for HttpFileTransfer {
    async fn upload(&self, file: &LocalFile) -> Result<FileRef, RemoteError> {
        let url = self.context.url(&self.upload_endpoint)?;
        let part = Part::bytes(file.contents.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime())?;
        let mut form = Form::new().part("file", part);
        for (key, value) in &self.context.extra_params {
            form = form.text(key.clone(), value.clone());
        }

        let body = self.send(self.client.post(url).multipart(form)).await?;
        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        if !parsed.success {
            return Err(RemoteError::Rejected(
                parsed.message.unwrap_or_else(|| "upload rejected".to_string()),
            ));
        }

        let mut uploaded = match (parsed.data, parsed.url) {
            (Some(data), _) => data,
            (None, Some(url)) => FileRef::new(file.name.clone(), url),
            (None, None) => {
                return Err(RemoteError::Malformed(
                    "upload response has neither data nor url".to_string(),
                ));
            }
        };
        if uploaded.url.is_empty() {
            return Err(RemoteError::Malformed("uploaded file has no url".to_string()));
        }
        if uploaded.name.is_empty() {
            uploaded.name = file.name.clone();
        }
        if uploaded.extension.is_none() {
            uploaded.extension = file_extension(&uploaded.name);
        }
        uploaded.size = uploaded.size.or(Some(file.size()));
        debug!(name = %uploaded.name, url = %uploaded.url, "file uploaded");
        Ok(uploaded)
    }

    async fn rename(&self, request: &RenameRequest) -> Result<FileRef, RemoteError> {
        let url = self.context.url(&self.rename_endpoint)?;
        let body = self.send(self.client.put(url).json(request)).await?;
        let parsed: RenameResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        match parsed {
            RenameResponse::Envelope {
                success: true,
                data: Some(file),
                ..
            }
            | RenameResponse::Bare(file) => {
                if file.url.is_empty() && file.name.is_empty() {
                    return Err(RemoteError::Malformed("renamed file is empty".to_string()));
                }
                Ok(file)
            }
            RenameResponse::Envelope {
                success: true,
                data: None,
                ..
            } => Err(RemoteError::Malformed("rename response has no data".to_string())),
            RenameResponse::Envelope { message, .. } => Err(RemoteError::Rejected(
                message.unwrap_or_else(|| "rename rejected".to_string()),
            )),
        }
    }
}
