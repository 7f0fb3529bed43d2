// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar OAuth routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::services::credentials::CALENDAR_SCOPE;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Maximum age of an OAuth `state` parameter.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(auth_start))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/logout", get(logout))
        .route("/auth/status", get(auth_status))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Callback URL derived from the request host.
fn callback_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8000");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/callback", scheme, host)
}

/// Start OAuth flow - redirect to Google consent.
async fn auth_start(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Redirect> {
    let oauth = state.config.google_oauth.as_ref().ok_or_else(|| {
        AppError::NotConfigured("Google OAuth client secret not configured".to_string())
    })?;

    let oauth_state = sign_state(
        &state.config.frontend_url,
        now_millis()?,
        &state.config.oauth_state_key,
    )?;

    let auth_url = format!(
        "{}?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope={}&\
         access_type=offline&\
         prompt=consent&\
         include_granted_scopes=true&\
         state={}",
        GOOGLE_AUTH_URL,
        urlencoding::encode(&oauth.client_id),
        urlencoding::encode(&callback_url(&headers)),
        urlencoding::encode(CALENDAR_SCOPE),
        oauth_state
    );

    tracing::info!(
        client_id = %oauth.client_id,
        "Starting OAuth flow, redirecting to Google"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for a credential, then return to the frontend.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let now = now_millis()?;
    let error_redirect = |frontend_url: &str| {
        Redirect::temporary(&format!("{}?calendar=error", frontend_url))
    };

    // Decode and verify frontend URL from state parameter
    let Some(frontend_url) = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key, now))
    else {
        tracing::warn!("Invalid, expired or missing OAuth state parameter");
        return Ok(error_redirect(&state.config.frontend_url));
    };

    // Check for OAuth errors
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Ok(error_redirect(&frontend_url));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("OAuth callback without authorization code");
        return Ok(error_redirect(&frontend_url));
    };

    tracing::info!("Exchanging authorization code for tokens");

    if let Err(e) = state
        .credentials
        .complete_login(&code, &callback_url(&headers))
        .await
    {
        tracing::error!(error = %e, "Authorization code exchange failed");
        return Ok(error_redirect(&frontend_url));
    }

    Ok(Redirect::temporary(&format!(
        "{}?calendar=connected",
        frontend_url
    )))
}

/// Sign `frontend_url|timestamp_hex` and pack it into a URL-safe state value.
fn sign_state(frontend_url: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    // Create the data payload: "frontend_url|timestamp_hex"
    let state_payload = format!("{}|{:x}", frontend_url, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(state_payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    // Combine payload + signature: "payload|signature_hex"
    let signed_state = format!("{}|{}", state_payload, hex::encode(signature));

    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify HMAC signature and age, and decode the frontend URL from the state parameter.
fn verify_and_decode_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.rsplitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let signature_hex = parts[0];
    let timestamp_hex = parts[1];
    let frontend_url = parts[2];

    // Reconstruct payload and verify signature
    let payload = format!("{}|{}", frontend_url, timestamp_hex);
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_at = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_at) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(frontend_url.to_string())
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// Logout - forget the stored calendar credential.
async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<LogoutResponse>> {
    state
        .credentials
        .logout()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(LogoutResponse {
        success: true,
        message: "Logged out from Google Calendar".to_string(),
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub state: String,
}

/// Current credential state.
async fn auth_status(State(state): State<Arc<AppState>>) -> Json<AuthStatusResponse> {
    let credential_state = state.credentials.state().await;
    Json(AuthStatusResponse {
        authenticated: state.credentials.is_valid().await,
        state: credential_state.as_str().to_string(),
    })
}
