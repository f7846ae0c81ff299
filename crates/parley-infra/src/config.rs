//! Environment-driven configuration.
//!
//! All provider credentials arrive through environment variables (the
//! deployment platform's secret store); they are wrapped in
//! [`secrecy::SecretString`] the moment they are read.

use std::path::Path;

use anyhow::{bail, Result};
use secrecy::SecretString;

/// Conversation instructions used when no prompt file is configured.
const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert reviewer. Score each idea you are given \
from 1 to 10 on originality, feasibility, and usefulness, and explain the scores briefly. \
Respond in Markdown.";

/// Free messages granted to a fresh user at signup.
pub const SIGNUP_FREE_MESSAGES: i64 = 5;

/// Runtime configuration for the Parley server.
#[derive(Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,

    pub openai_api_key: SecretString,
    pub model_id: String,

    pub supabase_url: String,
    pub supabase_service_role: SecretString,
    pub image_bucket: String,
    pub voice_bucket: String,
    pub signed_url_ttl_secs: u64,

    pub revenuecat_api_key: SecretString,
    pub webhook_token: SecretString,

    pub system_prompt_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injectable variable lookup.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            match get(key) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => bail!("{key} is not set"),
            }
        };

        Ok(Self {
            bind_addr: get("PARLEY_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            database_url: get("DATABASE_URL")
                .unwrap_or_else(crate::sqlite::pool::default_database_url),
            openai_api_key: SecretString::from(required("OPENAI_API_KEY")?),
            model_id: get("PARLEY_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_role: SecretString::from(required("SUPABASE_SERVICE_ROLE")?),
            image_bucket: required("SUPABASE_IMAGE_BUCKET")?,
            voice_bucket: required("SUPABASE_VOICE_BUCKET")?,
            signed_url_ttl_secs: get("PARLEY_SIGNED_URL_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            revenuecat_api_key: SecretString::from(required("REVENUECAT_API_KEY")?),
            webhook_token: SecretString::from(required("REVENUECAT_WEBHOOK_TOKEN")?),
            system_prompt_path: get("PARLEY_SYSTEM_PROMPT_FILE"),
        })
    }
}

/// Load the system prompt once at startup.
///
/// A missing or unreadable file logs a warning and falls back to the
/// built-in default rather than failing every chat creation.
pub async fn load_system_prompt(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
        Ok(_) => {
            tracing::warn!("system prompt file {} is empty, using default", path.display());
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(err) => {
            tracing::warn!(
                "failed to read system prompt file {}: {err}, using default",
                path.display()
            );
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("SUPABASE_URL", "https://proj.supabase.co"),
            ("SUPABASE_SERVICE_ROLE", "role-key"),
            ("SUPABASE_IMAGE_BUCKET", "images"),
            ("SUPABASE_VOICE_BUCKET", "voices"),
            ("REVENUECAT_API_KEY", "rc-key"),
            ("REVENUECAT_WEBHOOK_TOKEN", "hook-token"),
        ])
    }

    #[test]
    fn full_lookup_loads_with_defaults() {
        let env = full_env();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.model_id, "gpt-4o");
        assert_eq!(config.signed_url_ttl_secs, 3600);
        assert!(config.system_prompt_path.is_none());
    }

    #[test]
    fn missing_required_key_fails() {
        let mut env = full_env();
        env.remove("OPENAI_API_KEY");
        let err = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn overrides_are_respected() {
        let mut env = full_env();
        env.insert("PARLEY_BIND_ADDR", "127.0.0.1:3000");
        env.insert("PARLEY_MODEL", "gpt-4o-mini");
        env.insert("PARLEY_SIGNED_URL_TTL_SECS", "600");
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.model_id, "gpt-4o-mini");
        assert_eq!(config.signed_url_ttl_secs, 600);
    }

    #[tokio::test]
    async fn system_prompt_falls_back_to_default() {
        let prompt = load_system_prompt(None).await;
        assert!(prompt.contains("1 to 10"));

        let missing = std::path::Path::new("/definitely/not/here.prompt");
        let prompt = load_system_prompt(Some(missing)).await;
        assert!(prompt.contains("1 to 10"));
    }

    #[tokio::test]
    async fn system_prompt_reads_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.prompt");
        tokio::fs::write(&path, "You are terse.\n").await.unwrap();

        let prompt = load_system_prompt(Some(&path)).await;
        assert_eq!(prompt, "You are terse.");
    }
}
