//! Provider registry — maps provider names to endpoint configurations.
//!
//! All OpenAI-compatible services are defined here as static config entries.
//! The unified `OpenAiCompatibleProvider` uses these to reach any of them.

/// How to attach auth credentials to requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// No authentication required (local servers).
    None,
}

/// Configuration for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier.
    pub name: &'static str,
    /// Base URL for the API.
    pub base_url: &'static str,
    /// Path for chat completions (appended to base_url).
    pub chat_path: &'static str,
    /// Path for embeddings (appended to base_url).
    pub embeddings_path: &'static str,
    /// Environment variable names to try for the API key (in order).
    pub env_keys: &'static [&'static str],
    /// How to send auth credentials.
    pub auth_style: AuthStyle,
    /// Environment variable to override the base URL (e.g., OLLAMA_HOST).
    pub base_url_env: Option<&'static str>,
}

// ─── Provider Definitions ────────────────────────────────────────────────────

static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        env_keys: &["OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
    },
    ProviderConfig {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        env_keys: &["OPENROUTER_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
    },
    ProviderConfig {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("OLLAMA_HOST"),
    },
];

/// Look up a provider config by name.
pub fn get_provider_config(name: &str) -> Option<&'static ProviderConfig> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// All registered provider names.
pub fn all_provider_names() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_providers_resolve() {
        let openai = get_provider_config("openai").unwrap();
        assert_eq!(openai.auth_style, AuthStyle::Bearer);
        assert_eq!(openai.embeddings_path, "/embeddings");

        let ollama = get_provider_config("ollama").unwrap();
        assert_eq!(ollama.auth_style, AuthStyle::None);
        assert_eq!(ollama.base_url_env, Some("OLLAMA_HOST"));
    }

    #[test]
    fn test_unknown_provider_is_none() {
        assert!(get_provider_config("does-not-exist").is_none());
    }
}
