//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.helpdesk-relay/config.json`) and then
//! overridden by environment variables. Loaded once at startup; immutable afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Language model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Helpdesk (Chatwoot) API settings used to post replies.
    #[serde(default)]
    pub helpdesk: HelpdeskConfig,

    /// Chat widget embedded into the host page.
    #[serde(default)]
    pub widget: WidgetConfig,

    /// Outbound HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Bind address and port for the webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 3001). Overridden by PORT env.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the helpdesk must be able to reach the webhook).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    3001
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Model name, sampling temperature and credentials for the chat-completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// API key. Overridden by OPENAI_API_KEY env.
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL (default https://api.openai.com/v1).
    pub base_url: Option<String>,
}

fn default_model_name() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            temperature: default_temperature(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Chatwoot account API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpdeskConfig {
    /// Chatwoot installation root (default https://app.chatwoot.com). Overridden by CHATWOOT_API_URL env.
    #[serde(default = "default_chatwoot_url")]
    pub base_url: String,

    /// User or agent-bot access token. Overridden by CHATWOOT_API_TOKEN env.
    pub api_token: Option<String>,

    /// Account the conversations belong to. Overridden by CHATWOOT_ACCOUNT_ID env.
    pub account_id: Option<u64>,
}

fn default_chatwoot_url() -> String {
    "https://app.chatwoot.com".to_string()
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            base_url: default_chatwoot_url(),
            api_token: None,
            account_id: None,
        }
    }
}

/// Website widget settings. When `website_token` is unset the host page is served without the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Inbox website token. Overridden by CHATWOOT_WEBSITE_TOKEN env.
    pub website_token: Option<String>,

    /// Where the widget SDK is served from. Overridden by CHATWOOT_BASE_URL env.
    #[serde(default = "default_chatwoot_url")]
    pub base_url: String,

    #[serde(default = "default_launcher_title")]
    pub launcher_title: String,
}

fn default_launcher_title() -> String {
    "Chat with us".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            website_token: None,
            base_url: default_chatwoot_url(),
            launcher_title: default_launcher_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Upper bound for each outbound call (model and helpdesk), in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".helpdesk-relay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or RELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Load `.env` (if present), the config file, then apply environment overrides.
pub fn load_config_with_env(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    match dotenvy::dotenv() {
        Ok(p) => log::debug!("loaded environment from {}", p.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("reading .env"),
    }
    let (mut config, path) = load_config(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok((config, path))
}

/// Apply environment overrides using `lookup` (std::env::var in production). Blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    if let Some(v) = get("OPENAI_API_KEY") {
        config.model.api_key = Some(v);
    }
    if let Some(v) = get("OPENAI_MODEL") {
        config.model.model_name = v;
    }
    if let Some(v) = get("OPENAI_TEMPERATURE") {
        config.model.temperature = v
            .parse::<f32>()
            .with_context(|| format!("OPENAI_TEMPERATURE is not a number: {}", v))?;
    }
    if let Some(v) = get("OPENAI_BASE_URL") {
        config.model.base_url = Some(v);
    }
    if let Some(v) = get("CHATWOOT_API_URL") {
        config.helpdesk.base_url = v;
    }
    if let Some(v) = get("CHATWOOT_API_TOKEN") {
        config.helpdesk.api_token = Some(v);
    }
    if let Some(v) = get("CHATWOOT_ACCOUNT_ID") {
        let id = v
            .parse::<u64>()
            .with_context(|| format!("CHATWOOT_ACCOUNT_ID is not an integer: {}", v))?;
        config.helpdesk.account_id = Some(id);
    }
    if let Some(v) = get("CHATWOOT_WEBSITE_TOKEN") {
        config.widget.website_token = Some(v);
    }
    if let Some(v) = get("CHATWOOT_BASE_URL") {
        config.widget.base_url = v;
    }
    if let Some(v) = get("PORT") {
        config.gateway.port = v
            .parse::<u16>()
            .with_context(|| format!("PORT is not a valid port: {}", v))?;
    }
    if let Some(v) = get("RELAY_BIND") {
        config.gateway.bind = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.gateway.port, 3001);
        assert_eq!(c.gateway.bind, "0.0.0.0");
        assert_eq!(c.model.model_name, "gpt-3.5-turbo");
        assert!((c.model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(c.widget.launcher_title, "Chat with us");
        assert_eq!(c.http.request_timeout_secs, 60);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(c.gateway.port, 3001);
        assert_eq!(c.helpdesk.base_url, "https://app.chatwoot.com");
    }

    #[test]
    fn camel_case_file_keys() {
        let c: Config = serde_json::from_str(
            r#"{"model":{"modelName":"gpt-4o-mini","temperature":0.2},"helpdesk":{"accountId":7}}"#,
        )
        .unwrap();
        assert_eq!(c.model.model_name, "gpt-4o-mini");
        assert_eq!(c.helpdesk.account_id, Some(7));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut c = Config::default();
        c.model.api_key = Some("from-file".to_string());
        let vars = env(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("CHATWOOT_ACCOUNT_ID", "42"),
            ("PORT", "8080"),
            ("OPENAI_TEMPERATURE", "0.1"),
        ]);
        apply_env_overrides(&mut c, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(c.model.api_key.as_deref(), Some("sk-env"));
        assert_eq!(c.helpdesk.account_id, Some(42));
        assert_eq!(c.gateway.port, 8080);
        assert!((c.model.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn blank_env_is_ignored() {
        let mut c = Config::default();
        c.helpdesk.api_token = Some("kept".to_string());
        let vars = env(&[("CHATWOOT_API_TOKEN", "   "), ("PORT", "")]);
        apply_env_overrides(&mut c, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(c.helpdesk.api_token.as_deref(), Some("kept"));
        assert_eq!(c.gateway.port, 3001);
    }

    #[test]
    fn bad_numeric_env_is_an_error() {
        let mut c = Config::default();
        let vars = env(&[("CHATWOOT_ACCOUNT_ID", "acme")]);
        assert!(apply_env_overrides(&mut c, |k| vars.get(k).cloned()).is_err());
    }
}
