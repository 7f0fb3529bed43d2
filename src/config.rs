// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables and local files.
//!
//! The Gemini API key and the Google OAuth client secret are read once at
//! startup. Missing Gemini or OAuth configuration disables the matching
//! feature instead of aborting startup.

use crate::services::completion::DEFAULT_GEMINI_URL;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Google OAuth client credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS and post-login redirects
    pub frontend_url: String,
    /// Gemini `generateContent` endpoint
    pub gemini_url: String,
    /// Single-slot credential file
    pub token_path: PathBuf,
    /// Timezone attached to created events
    pub calendar_timezone: String,

    // --- Secrets ---
    /// Gemini API key (None disables the assistant)
    pub gemini_api_key: Option<String>,
    /// Google OAuth client (None disables calendar login)
    pub google_oauth: Option<OAuthClientConfig>,
    /// HMAC key for the OAuth `state` parameter (raw bytes)
    pub oauth_state_key: Vec<u8>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("gemini_url", &self.gemini_url)
            .field("token_path", &self.token_path)
            .field("calendar_timezone", &self.calendar_timezone)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("google_oauth", &self.google_oauth)
            .field("oauth_state_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key_path = env::var("GEMINI_API_KEY_FILE").unwrap_or_else(|_| "api_key.txt".into());
        let gemini_api_key = match env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
            _ => read_api_key(Path::new(&api_key_path))?,
        };

        let client_secret_path =
            env::var("GOOGLE_CLIENT_SECRET_FILE").unwrap_or_else(|_| "client_secret.json".into());
        let google_oauth = match (env::var("GOOGLE_CLIENT_ID"), env::var("GOOGLE_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) => Some(OAuthClientConfig {
                client_id: client_id.trim().to_string(),
                client_secret: client_secret.trim().to_string(),
            }),
            _ => read_client_secret(Path::new(&client_secret_path))?,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gemini_url: env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_GEMINI_URL.into()),
            token_path: env::var("GOOGLE_TOKEN_FILE")
                .unwrap_or_else(|_| "token.json".to_string())
                .into(),
            calendar_timezone: env::var("CALENDAR_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Jakarta".to_string()),
            gemini_api_key,
            google_oauth,
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            gemini_url: "http://127.0.0.1:9/generate".to_string(),
            token_path: PathBuf::from("test-token.json"),
            calendar_timezone: "Asia/Jakarta".to_string(),
            gemini_api_key: Some("test_api_key".to_string()),
            google_oauth: Some(OAuthClientConfig {
                client_id: "test_client_id".to_string(),
                client_secret: "test_secret".to_string(),
            }),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }
}

/// Read the Gemini API key file. Missing or blank files yield `None`.
pub fn read_api_key(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let key = contents.trim();
            if key.is_empty() {
                tracing::warn!(path = %path.display(), "Gemini API key file is empty");
                Ok(None)
            } else {
                Ok(Some(key.to_string()))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Gemini API key file not found");
            Ok(None)
        }
        Err(e) => Err(ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

#[derive(Deserialize)]
struct ClientSecretFile {
    web: Option<ClientSecretSection>,
    installed: Option<ClientSecretSection>,
}

#[derive(Deserialize)]
struct ClientSecretSection {
    client_id: String,
    client_secret: String,
}

/// Read a Google client secret document (`web` or `installed` section).
pub fn read_client_secret(path: &Path) -> Result<Option<OAuthClientConfig>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "Google client secret not found, calendar login disabled"
            );
            return Ok(None);
        }
        Err(e) => {
            return Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let file: ClientSecretFile =
        serde_json::from_str(&contents).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let section = file
        .web
        .or(file.installed)
        .ok_or_else(|| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: "expected a \"web\" or \"installed\" section".to_string(),
        })?;

    Ok(Some(OAuthClientConfig {
        client_id: section.client_id,
        client_secret: section.client_secret,
    }))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn api_key_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  abc123  ").unwrap();
        assert_eq!(read_api_key(file.path()).unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_blank_api_key_disables_assistant() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_api_key(&dir.path().join("nope.txt")).unwrap(), None);

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "\n  \n").unwrap();
        assert_eq!(read_api_key(&blank).unwrap(), None);
    }

    #[test]
    fn client_secret_accepts_web_and_installed() {
        let dir = tempfile::tempdir().unwrap();

        let web = dir.path().join("web.json");
        std::fs::write(
            &web,
            r#"{"web":{"client_id":"id-w","client_secret":"s-w","auth_uri":"x"}}"#,
        )
        .unwrap();
        let cfg = read_client_secret(&web).unwrap().unwrap();
        assert_eq!(cfg.client_id, "id-w");
        assert_eq!(cfg.client_secret, "s-w");

        let installed = dir.path().join("installed.json");
        std::fs::write(
            &installed,
            r#"{"installed":{"client_id":"id-i","client_secret":"s-i"}}"#,
        )
        .unwrap();
        assert_eq!(
            read_client_secret(&installed).unwrap().unwrap().client_id,
            "id-i"
        );
    }

    #[test]
    fn client_secret_without_section_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"other":{}}"#).unwrap();
        assert!(matches!(
            read_client_secret(&path),
            Err(ConfigError::Unreadable { .. })
        ));
        assert_eq!(read_client_secret(&dir.path().join("none.json")).unwrap(), None);
    }

    #[test]
    fn debug_redacts_client_secret() {
        let cfg = Config::test_default();
        let rendered = format!("{:?}", cfg.google_oauth);
        assert!(!rendered.contains("test_secret"));
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let cfg = Config::test_default();
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("test_api_key"));
        assert!(!rendered.contains("test_secret"));
        assert!(!rendered.contains("test_oauth_state_key"));
        // Byte rendering of the state key must not leak either.
        assert!(!rendered.contains(&format!("{:?}", cfg.oauth_state_key)));
        assert!(rendered.contains("test_client_id"));
        assert!(rendered.contains("<redacted>"));
    }
}
