// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth credential lifecycle for the calendar delegate.
//!
//! Handles:
//! - Loading the single persisted credential at startup
//! - Refreshing an expired access token (serialized by a per-store lock)
//! - Persisting refreshed and newly granted credentials
//! - Logout (credential file deletion)
//!
//! ```text
//! Absent ──load──▶ LoadedInvalid            (expired, no refresh token)
//!        └──load──▶ LoadedValid ──expired──▶ Refreshing ──▶ LoadedValid
//!                                                       └──▶ RefreshFailed
//! RefreshFailed ──next use──▶ Refreshing
//! ```

use crate::models::Credential;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Google OAuth token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scope requested for calendar access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const TOKEN_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Lifecycle state of the stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    Absent,
    LoadedInvalid,
    LoadedValid,
    Refreshing,
    RefreshFailed,
}

impl CredentialState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::LoadedInvalid => "loaded_invalid",
            Self::LoadedValid => "loaded_valid",
            Self::Refreshing => "refreshing",
            Self::RefreshFailed => "refresh_failed",
        }
    }
}

/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("token refresh failed: {0}")]
    Refresh(String),

    #[error("authorization code exchange failed: {0}")]
    Exchange(String),

    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Token endpoint response (refresh and code exchange share the shape).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Turn the response into a credential, keeping `previous`'s refresh token
    /// and scopes when the provider omits them.
    pub fn into_credential(self, previous: Option<&Credential>) -> Credential {
        let refresh_token = self
            .refresh_token
            .or_else(|| previous.and_then(|p| p.refresh_token.clone()));
        let scopes = match self.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => previous.map(|p| p.scopes.clone()).unwrap_or_default(),
        };

        Credential {
            access_token: self.access_token,
            refresh_token,
            expiry: self
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            scopes,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
        }
    }
}

/// OAuth token operations needed by the store.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CredentialError>;

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, CredentialError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// GoogleOAuthClient - token endpoint over HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Google OAuth token endpoint client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String) -> anyhow::Result<Self> {
        Self::with_token_url(client_id, client_secret, GOOGLE_TOKEN_URL)
    }

    pub fn with_token_url(
        client_id: String,
        client_secret: String,
        token_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_HTTP_TIMEOUT)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            token_url: token_url.into(),
            client_id,
            client_secret,
        })
    }

    async fn post_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Google reports failures as {"error": "...", "error_description": "..."}
            let detail = match serde_json::from_str::<OAuthErrorBody>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => format!("HTTP {}", status),
            };
            return Err(detail);
        }

        response
            .json()
            .await
            .map_err(|e| format!("failed to parse token response: {}", e))
    }
}

#[async_trait]
impl TokenEndpoint for GoogleOAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CredentialError> {
        self.post_form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
        .map_err(CredentialError::Refresh)
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, CredentialError> {
        self.post_form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
        .map_err(CredentialError::Exchange)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CredentialStore - owns the single credential slot
// ─────────────────────────────────────────────────────────────────────────────

struct Slot {
    state: CredentialState,
    credential: Option<Credential>,
}

/// Owner of the calendar credential and its token file.
pub struct CredentialStore {
    token_path: PathBuf,
    oauth: Arc<dyn TokenEndpoint>,
    slot: RwLock<Slot>,
    /// Serializes refresh, login and logout so the token file has one writer.
    refresh_lock: Mutex<()>,
}

impl CredentialStore {
    /// Create an empty store. Call [`CredentialStore::initialize`] to load the file.
    pub fn new(token_path: impl Into<PathBuf>, oauth: Arc<dyn TokenEndpoint>) -> Self {
        Self {
            token_path: token_path.into(),
            oauth,
            slot: RwLock::new(Slot {
                state: CredentialState::Absent,
                credential: None,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    pub async fn state(&self) -> CredentialState {
        self.slot.read().await.state
    }

    pub async fn is_valid(&self) -> bool {
        self.state().await == CredentialState::LoadedValid
    }

    /// Load the persisted credential, refreshing it once if it has expired.
    pub async fn initialize(&self) -> CredentialState {
        let _guard = self.refresh_lock.lock().await;

        let credential = match read_credential(&self.token_path).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                tracing::warn!(
                    path = %self.token_path.display(),
                    "No calendar credential found, login required"
                );
                return self.set(CredentialState::Absent, None).await;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.token_path.display(),
                    "Ignoring unreadable calendar credential"
                );
                return self.set(CredentialState::Absent, None).await;
            }
        };

        if !credential.is_expired() {
            tracing::info!("Calendar credential loaded");
            return self
                .set(CredentialState::LoadedValid, Some(credential))
                .await;
        }

        self.refresh_locked(credential).await
    }

    /// Access token for calendar calls, or `None` when the store is not usable.
    ///
    /// A loaded credential that has expired since startup is refreshed here, and
    /// a credential whose last refresh failed is retried.
    pub async fn access_token(&self) -> Option<String> {
        {
            let slot = self.slot.read().await;
            match (slot.state, &slot.credential) {
                (CredentialState::LoadedValid, Some(c)) if !c.is_expired() => {
                    return Some(c.access_token.clone())
                }
                // Expired, failed before, or a refresh is in flight: wait for the lock.
                (CredentialState::LoadedValid, Some(_))
                | (CredentialState::RefreshFailed, Some(_))
                | (CredentialState::Refreshing, _) => {}
                _ => return None,
            }
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited for the lock.
        let credential = {
            let slot = self.slot.read().await;
            match (slot.state, &slot.credential) {
                (CredentialState::LoadedValid, Some(c)) if !c.is_expired() => {
                    return Some(c.access_token.clone())
                }
                (CredentialState::LoadedValid, Some(c))
                | (CredentialState::RefreshFailed, Some(c)) => c.clone(),
                _ => return None,
            }
        };

        match self.refresh_locked(credential).await {
            CredentialState::LoadedValid => self
                .slot
                .read()
                .await
                .credential
                .as_ref()
                .map(|c| c.access_token.clone()),
            _ => None,
        }
    }

    /// Exchange an authorization code and persist the resulting credential.
    pub async fn complete_login(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<(), CredentialError> {
        let _guard = self.refresh_lock.lock().await;

        let response = self.oauth.exchange_code(code, redirect_uri).await?;
        let previous = self.slot.read().await.credential.clone();
        let credential = response.into_credential(previous.as_ref());

        write_credential(&self.token_path, &credential).await?;
        self.set(CredentialState::LoadedValid, Some(credential))
            .await;

        tracing::info!("Calendar credential granted and stored");
        Ok(())
    }

    /// Delete the persisted credential and reset to `Absent`.
    pub async fn logout(&self) -> Result<(), CredentialError> {
        let _guard = self.refresh_lock.lock().await;

        match tokio::fs::remove_file(&self.token_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.set(CredentialState::Absent, None).await;

        tracing::info!("Calendar credential removed");
        Ok(())
    }

    /// Refresh `credential`. Caller must hold `refresh_lock`.
    async fn refresh_locked(&self, credential: Credential) -> CredentialState {
        let refresh_token = match credential.refresh_token.clone() {
            Some(token) if credential.can_refresh() => token,
            _ => {
                tracing::warn!("Calendar credential expired and has no refresh token");
                return self
                    .set(CredentialState::LoadedInvalid, Some(credential))
                    .await;
            }
        };

        self.slot.write().await.state = CredentialState::Refreshing;
        tracing::info!("Calendar access token expired, refreshing");

        match self.oauth.refresh(&refresh_token).await {
            Ok(response) => {
                let refreshed = response.into_credential(Some(&credential));
                if let Err(e) = write_credential(&self.token_path, &refreshed).await {
                    // The in-memory credential is still good for this process.
                    tracing::error!(error = %e, "Failed to persist refreshed credential");
                }
                tracing::info!("Calendar access token refreshed");
                self.set(CredentialState::LoadedValid, Some(refreshed))
                    .await
            }
            Err(e) => {
                tracing::error!(error = %e, "Calendar token refresh failed");
                self.set(CredentialState::RefreshFailed, Some(credential))
                    .await
            }
        }
    }

    async fn set(&self, state: CredentialState, credential: Option<Credential>) -> CredentialState {
        let mut slot = self.slot.write().await;
        slot.state = state;
        slot.credential = credential;
        state
    }
}

/// Read the credential file. A missing file is `Ok(None)`.
pub async fn read_credential(path: &Path) -> Result<Option<Credential>, CredentialError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write the credential file atomically (temp file + rename).
///
/// On unix the file is created owner-only (`0600`).
pub async fn write_credential(path: &Path, credential: &Credential) -> Result<(), CredentialError> {
    let bytes = serde_json::to_vec_pretty(credential)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    // A leftover temp file would keep its old permissions.
    match tokio::fs::remove_file(&tmp).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&tmp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn previous() -> Credential {
        Credential {
            access_token: "old".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expiry: None,
            scopes: vec![CALENDAR_SCOPE.to_string()],
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn token_response_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            expires_in: Some(3600),
            refresh_token: None,
            scope: None,
            token_type: None,
        };
        let credential = response.into_credential(Some(&previous()));

        assert_eq!(credential.access_token, "new");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(credential.scopes, vec![CALENDAR_SCOPE.to_string()]);
        assert!(!credential.is_expired());
    }

    #[test]
    fn token_response_replaces_rotated_refresh_token_and_scopes() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            expires_in: None,
            refresh_token: Some("refresh-2".to_string()),
            scope: Some("a b".to_string()),
            token_type: Some("Bearer".to_string()),
        };
        let credential = response.into_credential(Some(&previous()));

        assert_eq!(credential.refresh_token.as_deref(), Some("refresh-2"));
        assert_eq!(credential.scopes, vec!["a".to_string(), "b".to_string()]);
        assert!(credential.expiry.is_none());
    }

    #[test]
    fn state_names_are_stable() {
        assert_eq!(CredentialState::LoadedValid.as_str(), "loaded_valid");
        assert_eq!(
            serde_json::to_value(CredentialState::RefreshFailed).unwrap(),
            "refresh_failed"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn credential_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        // Stale temp file from an interrupted write, world-readable.
        std::fs::write(dir.path().join("token.json.tmp"), b"stale").unwrap();
        std::fs::set_permissions(
            dir.path().join("token.json.tmp"),
            std::fs::Permissions::from_mode(0o644),
        )
        .unwrap();

        write_credential(&path, &previous()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!dir.path().join("token.json.tmp").exists());

        let loaded = read_credential(&path).await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "old");
    }
}
