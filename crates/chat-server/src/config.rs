use anyhow::Context;
use inference::{
    InferenceConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_PATH, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS,
};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Deserialize)]
pub(crate) struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub(crate) listen_addr: String,
    #[serde(default = "default_max_upload_bytes")]
    pub(crate) max_upload_bytes: usize,
    #[serde(default)]
    pub(crate) inference: InferenceSettings,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InferenceSettings {
    pub(crate) base_url: Option<String>,
    pub(crate) chat_path: Option<String>,
    pub(crate) model: Option<String>,
    /// Name of the environment variable holding the API key.
    pub(crate) api_key_env: Option<String>,
    pub(crate) timeout_ms: Option<u64>,
    pub(crate) temperature: Option<f32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_upload_bytes: default_max_upload_bytes(),
            inference: InferenceSettings::default(),
        }
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

pub(crate) fn load_server_config(path: &Path) -> anyhow::Result<ServerConfig> {
    if !path.exists() {
        tracing::info!(
            config = %path.display(),
            "config file not found; using defaults"
        );
        return Ok(ServerConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ServerConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    validate_server_config(&config)?;
    Ok(config)
}

fn validate_server_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.listen_addr.trim().is_empty() {
        anyhow::bail!("listen_addr cannot be empty");
    }
    if config.max_upload_bytes == 0 {
        anyhow::bail!("max_upload_bytes must be greater than zero");
    }
    let inference = &config.inference;
    if let Some(base_url) = inference.base_url.as_deref() {
        if base_url.trim().is_empty() {
            anyhow::bail!("inference.base_url cannot be empty");
        }
    }
    if let Some(model) = inference.model.as_deref() {
        if model.trim().is_empty() {
            anyhow::bail!("inference.model cannot be empty");
        }
    }
    if inference.timeout_ms == Some(0) {
        anyhow::bail!("inference.timeout_ms must be greater than zero");
    }
    if let Some(temperature) = inference.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            anyhow::bail!("inference.temperature must be between 0 and 2");
        }
    }
    Ok(())
}

/// Builds the client config, reading the API key through `lookup_env`.
pub(crate) fn resolve_inference_config<F>(
    settings: &InferenceSettings,
    lookup_env: F,
) -> anyhow::Result<InferenceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let key_env = settings
        .api_key_env
        .as_deref()
        .unwrap_or(DEFAULT_API_KEY_ENV);
    let api_key = lookup_env(key_env)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .with_context(|| format!("environment variable {key_env} must hold the inference API key"))?;

    Ok(InferenceConfig::new(api_key)
        .with_base_url(settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
        .with_chat_path(settings.chat_path.as_deref().unwrap_or(DEFAULT_CHAT_PATH))
        .with_model(settings.model.as_deref().unwrap_or(DEFAULT_MODEL))
        .with_timeout_ms(settings.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
        .with_temperature(settings.temperature))
}
