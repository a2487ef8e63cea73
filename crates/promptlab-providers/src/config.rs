//! Provider configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use promptlab_core::{Error, Result};

/// Supported chat-completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }

    /// Parse from a case-insensitive name or alias
    pub fn from_name(name: &str) -> Option<ProviderKind> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Some(ProviderKind::OpenAI),
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "google" | "gemini" => Some(ProviderKind::Google),
            _ => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
            ProviderKind::Google => "gemini-1.5-flash",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "https://api.openai.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Google => "https://generativelanguage.googleapis.com",
        }
    }

    /// Environment variables holding the API key, in lookup order
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::OpenAI => &["OPENAI_API_KEY"],
            ProviderKind::Anthropic => &["ANTHROPIC_API_KEY"],
            ProviderKind::Google => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the streaming chat client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ProviderConfig {
    /// Create configuration from environment variables (and `.env`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("PROMPTLAB_PROVIDER") {
            Some(name) => ProviderKind::from_name(&name).ok_or_else(|| {
                Error::Configuration(format!(
                    "Unknown provider '{}', expected openai, anthropic or google",
                    name
                ))
            })?,
            None => ProviderKind::OpenAI,
        };

        let api_key = provider
            .api_key_vars()
            .iter()
            .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "{} environment variable not found",
                    provider.api_key_vars().join(" or ")
                ))
            })?;

        let mut config = Self::new(provider, api_key);
        if let Some(model) = lookup("PROMPTLAB_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = lookup("PROMPTLAB_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    /// Create configuration with explicit values and provider defaults
    pub fn new(provider: ProviderKind, api_key: String) -> Self {
        Self {
            provider,
            api_key,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_to_openai() {
        let config = ProviderConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAI);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_google_accepts_gemini_key_and_overrides() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("PROMPTLAB_PROVIDER", "Gemini"),
            ("GEMINI_API_KEY", "g-key"),
            ("PROMPTLAB_MODEL", "gemini-1.5-pro"),
            ("PROMPTLAB_BASE_URL", "http://localhost:8080/"),
        ]))
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Google);
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = ProviderConfig::from_lookup(lookup(&[("PROMPTLAB_PROVIDER", "anthropic")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("ANTHROPIC_API_KEY")));

        let err = ProviderConfig::from_lookup(lookup(&[("PROMPTLAB_PROVIDER", "mistral")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
