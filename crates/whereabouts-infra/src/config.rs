//! Settings and credentials loading.
//!
//! `Settings` comes from `config.toml` next to the working directory (or a
//! caller-supplied path) and falls back to defaults when the file is
//! missing or malformed. API keys come from the environment only and are
//! wrapped in [`SecretString`] so they never appear in Debug output or
//! logs.

use std::path::Path;

use anyhow::Context;
use secrecy::SecretString;

use whereabouts_types::config::Settings;

/// Environment variable holding the Gemini API key (always required).
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable holding the Pinecone API key (required for the
/// pinecone backend).
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";

/// Load settings from `{dir}/config.toml`.
///
/// - Missing file: returns [`Settings::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the
///   default.
pub async fn load_settings(dir: &Path) -> Settings {
    let config_path = dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Settings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            Settings::default()
        }
    }
}

/// API keys resolved from the environment.
pub struct ApiCredentials {
    pub gemini_api_key: SecretString,
    pub pinecone_api_key: Option<SecretString>,
}

/// Read API keys from the environment.
///
/// The Gemini key is always required (every pipeline classifies and
/// composes); the Pinecone key is optional and only checked when the
/// pinecone backend is selected (the caller enforces that).
pub fn load_credentials() -> anyhow::Result<ApiCredentials> {
    let gemini_api_key = std::env::var(GEMINI_API_KEY_VAR)
        .map(SecretString::from)
        .with_context(|| format!("{GEMINI_API_KEY_VAR} is not set"))?;

    let pinecone_api_key = std::env::var(PINECONE_API_KEY_VAR).ok().map(SecretString::from);

    Ok(ApiCredentials {
        gemini_api_key,
        pinecone_api_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use whereabouts_types::config::IndexBackend;

    #[tokio::test]
    async fn load_settings_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.index_dimension, 3072);
        assert_eq!(settings.index_backend, IndexBackend::Memory);
    }

    #[tokio::test]
    async fn load_settings_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
index_name = "household"
index_dimension = 768
index_backend = "pinecone"
index_host = "https://household.svc.pinecone.io"
"#,
        )
        .await
        .unwrap();

        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.index_name, "household");
        assert_eq!(settings.index_dimension, 768);
        assert_eq!(settings.index_backend, IndexBackend::Pinecone);
    }

    #[tokio::test]
    async fn load_settings_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "not { valid toml !!!")
            .await
            .unwrap();

        let settings = load_settings(tmp.path()).await;
        assert_eq!(settings.index_name, "whereabouts-index");
    }
}
