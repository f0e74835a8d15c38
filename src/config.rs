use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::GenerationError;

const CONFIG_FILE: &str = "syllabus";
const ENV_PREFIX: &str = "SYLLABUS";

/// Runtime settings, layered: optional `syllabus.toml`, then `SYLLABUS_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub gemini_model: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Bearer token for Drive/Docs/Sheets, e.g. from `gcloud auth print-access-token`.
    #[serde(default)]
    pub google_access_token: Option<String>,
    #[serde(default)]
    pub syllabus_template_id: Option<String>,
    /// Workspace domain granted writer access on every generated file.
    #[serde(default)]
    pub share_domain: Option<String>,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_concurrency")]
    pub class_concurrency: usize,
    #[serde(default = "default_classes_per_document")]
    pub classes_per_document: usize,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    3000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/syllabus.sqlite")
}

fn default_timeout() -> u64 {
    120
}

fn default_concurrency() -> usize {
    4
}

fn default_classes_per_document() -> usize {
    6
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gemini_api_key: None,
            gemini_model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            google_access_token: None,
            syllabus_template_id: None,
            share_domain: None,
            db_path: default_db_path(),
            request_timeout_secs: default_timeout(),
            class_concurrency: default_concurrency(),
            classes_per_document: default_classes_per_document(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;
        Ok(settings)
    }

    pub fn gemini_api_key(&self) -> Result<&str, GenerationError> {
        non_empty(&self.gemini_api_key)
            .ok_or(GenerationError::MissingSetting("gemini_api_key", "GEMINI_API_KEY"))
    }

    pub fn google_access_token(&self) -> Result<&str, GenerationError> {
        non_empty(&self.google_access_token).ok_or(GenerationError::MissingSetting(
            "google_access_token",
            "GOOGLE_ACCESS_TOKEN",
        ))
    }

    pub fn syllabus_template_id(&self) -> Result<&str, GenerationError> {
        non_empty(&self.syllabus_template_id).ok_or(GenerationError::MissingSetting(
            "syllabus_template_id",
            "SYLLABUS_TEMPLATE_ID",
        ))
    }

    pub fn share_domain(&self) -> Option<&str> {
        non_empty(&self.share_domain)
    }
}

fn non_empty(val: &Option<String>) -> Option<&str> {
    val.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
