pub mod docs;
pub mod drive;
pub mod sheets;

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::{GenerationError, Result};

static FILE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").unwrap());

/// The document, spreadsheet and file-storage calls the generators need.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Copy a file (the syllabus template) and return the new file id.
    async fn copy_file(&self, file_id: &str, name: &str) -> Result<String>;
    async fn create_document(&self, name: &str) -> Result<String>;
    /// Grant writer access to everyone in `domain`.
    async fn share_with_domain(&self, file_id: &str, domain: &str, discoverable: bool) -> Result<()>;
    async fn replace_placeholder(&self, document_id: &str, placeholder: &str, text: &str) -> Result<()>;
    /// Insert at a UTF-16 offset of the document body.
    async fn insert_text(&self, document_id: &str, index: usize, text: &str) -> Result<()>;
    async fn create_spreadsheet(&self, title: &str) -> Result<String>;
    async fn write_values(&self, spreadsheet_id: &str, range: &str, values: &[Vec<String>]) -> Result<()>;
    async fn read_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;
}

/// REST client for Drive v3, Docs v1 and Sheets v4 using a bearer token.
pub struct GoogleWorkspace {
    http: reqwest::Client,
    token: String,
}

impl GoogleWorkspace {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(GoogleWorkspace {
            http,
            token: settings.google_access_token()?.to_string(),
        })
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
    }

    /// Send, map non-2xx to `GenerationError::Api`, decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        service: &'static str,
        req: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = self.authed(req).send().await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Api {
                service,
                status: status.as_u16(),
                body: raw,
            });
        }
        if raw.trim().is_empty() {
            return Ok(serde_json::from_str("{}")?);
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl Workspace for GoogleWorkspace {
    async fn copy_file(&self, file_id: &str, name: &str) -> Result<String> {
        drive::copy_file(self, file_id, name).await
    }

    async fn create_document(&self, name: &str) -> Result<String> {
        drive::create_document(self, name).await
    }

    async fn share_with_domain(&self, file_id: &str, domain: &str, discoverable: bool) -> Result<()> {
        drive::share_with_domain(self, file_id, domain, discoverable).await
    }

    async fn replace_placeholder(&self, document_id: &str, placeholder: &str, text: &str) -> Result<()> {
        docs::replace_all_text(self, document_id, placeholder, text).await
    }

    async fn insert_text(&self, document_id: &str, index: usize, text: &str) -> Result<()> {
        docs::insert_text(self, document_id, index, text).await
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<String> {
        sheets::create(self, title).await
    }

    async fn write_values(&self, spreadsheet_id: &str, range: &str, values: &[Vec<String>]) -> Result<()> {
        sheets::update_values(self, spreadsheet_id, range, values).await
    }

    async fn read_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        sheets::get_values(self, spreadsheet_id, range).await
    }
}

/// File id from a Docs/Sheets/Drive URL (`.../d/<id>/edit`).
pub fn file_id_from_url(url: &str) -> Result<String> {
    FILE_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| GenerationError::InvalidSheetUrl(url.to_string()))
}
