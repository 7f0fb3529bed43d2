// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::{Duration, Utc};
use fitbot::config::Config;
use fitbot::models::Credential;
use fitbot::routes::create_router;
use fitbot::services::calendar::{EventBody, EventQuery, ProviderEvent};
use fitbot::services::credentials::{write_credential, TokenResponse, CALENDAR_SCOPE};
use fitbot::services::{
    Assistant, CalendarError, CalendarProvider, CalendarService, CompletionError,
    CompletionOracle, CredentialError, CredentialStore, TokenEndpoint,
};
use fitbot::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ─── Completion oracle ───────────────────────────────────────

/// Oracle returning a canned reply and counting calls.
pub struct FakeOracle {
    reply: Result<String, CompletionError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeOracle {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: CompletionError) -> Self {
        Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionOracle for FakeOracle {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

// ─── Token endpoint ──────────────────────────────────────────

/// Token endpoint handing out fixed tokens.
pub struct FakeTokenEndpoint {
    pub refresh_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    pub fail_refresh: bool,
    /// Number of leading refresh calls that fail before refresh succeeds
    pub fail_first_refreshes: usize,
    /// `expires_in` granted by `exchange_code`
    pub exchange_expires_in: i64,
    pub refresh_delay: std::time::Duration,
}

impl Default for FakeTokenEndpoint {
    fn default() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            fail_refresh: false,
            fail_first_refreshes: 0,
            exchange_expires_in: 3600,
            refresh_delay: std::time::Duration::ZERO,
        }
    }
}

#[allow(dead_code)]
impl FakeTokenEndpoint {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenEndpoint for FakeTokenEndpoint {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse, CredentialError> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        if self.fail_refresh || call < self.fail_first_refreshes {
            return Err(CredentialError::Refresh("invalid_grant".to_string()));
        }
        Ok(TokenResponse {
            access_token: "refreshed-token".to_string(),
            expires_in: Some(3600),
            refresh_token: None,
            scope: None,
            token_type: None,
        })
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenResponse, CredentialError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if code == "bad-code" {
            return Err(CredentialError::Exchange("invalid_grant".to_string()));
        }
        Ok(TokenResponse {
            access_token: "granted-token".to_string(),
            expires_in: Some(self.exchange_expires_in),
            refresh_token: Some("granted-refresh".to_string()),
            scope: Some(CALENDAR_SCOPE.to_string()),
            token_type: Some("Bearer".to_string()),
        })
    }
}

// ─── Calendar provider ───────────────────────────────────────

/// Calendar provider that records every call.
#[derive(Default)]
pub struct FakeCalendar {
    pub inserted: Mutex<Vec<(String, EventBody)>>,
    pub queries: Mutex<Vec<EventQuery>>,
    pub deleted: Mutex<Vec<String>>,
    /// Events returned from `list_events`
    pub events: Vec<ProviderEvent>,
    /// When set, every call fails with this provider message
    pub failure: Option<String>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeCalendar {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_events(events: Vec<ProviderEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CalendarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(CalendarError::Provider(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CalendarProvider for FakeCalendar {
    async fn insert_event(
        &self,
        access_token: &str,
        body: &EventBody,
    ) -> Result<ProviderEvent, CalendarError> {
        self.check()?;
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push((access_token.to_string(), body.clone()));
        let id = format!("evt-{}", inserted.len());
        Ok(ProviderEvent {
            html_link: Some(format!("https://calendar.google.com/event?eid={}", id)),
            id,
            summary: Some(body.summary.clone()),
            description: Some(body.description.clone()),
            start: Some(body.start.clone()),
        })
    }

    async fn list_events(
        &self,
        _access_token: &str,
        query: &EventQuery,
    ) -> Result<Vec<ProviderEvent>, CalendarError> {
        self.check()?;
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.events.clone())
    }

    async fn delete_event(&self, _access_token: &str, event_id: &str) -> Result<(), CalendarError> {
        self.check()?;
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

// ─── Credentials ─────────────────────────────────────────────

#[allow(dead_code)]
pub fn valid_credential() -> Credential {
    Credential {
        access_token: "stored-token".to_string(),
        refresh_token: Some("stored-refresh".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
        scopes: vec![CALENDAR_SCOPE.to_string()],
        token_type: "Bearer".to_string(),
    }
}

#[allow(dead_code)]
pub fn expired_credential(refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: "expired-token".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expiry: Some(Utc::now() - Duration::hours(1)),
        scopes: vec![CALENDAR_SCOPE.to_string()],
        token_type: "Bearer".to_string(),
    }
}

// ─── Test app ────────────────────────────────────────────────

/// Router plus handles to every fake behind it.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub oracle: Arc<FakeOracle>,
    pub oauth: Arc<FakeTokenEndpoint>,
    pub provider: Arc<FakeCalendar>,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt; // for oneshot
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn assistant(&self) -> &Assistant {
        self.state.assistant.as_ref().unwrap()
    }
}

pub struct TestAppBuilder {
    credential: Option<Credential>,
    raw_token_file: Option<String>,
    oracle: FakeOracle,
    assistant: bool,
    oauth: FakeTokenEndpoint,
    provider: FakeCalendar,
}

#[allow(dead_code)]
impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            credential: None,
            raw_token_file: None,
            oracle: FakeOracle::replying("Lakukan 3 set squat dengan 8 rep."),
            assistant: true,
            oauth: FakeTokenEndpoint::default(),
            provider: FakeCalendar::default(),
        }
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn raw_token_file(mut self, contents: &str) -> Self {
        self.raw_token_file = Some(contents.to_string());
        self
    }

    pub fn oracle(mut self, oracle: FakeOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn reply(self, text: &str) -> Self {
        self.oracle(FakeOracle::replying(text))
    }

    pub fn without_assistant(mut self) -> Self {
        self.assistant = false;
        self
    }

    pub fn oauth(mut self, oauth: FakeTokenEndpoint) -> Self {
        self.oauth = oauth;
        self
    }

    pub fn provider(mut self, provider: FakeCalendar) -> Self {
        self.provider = provider;
        self
    }

    pub async fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");

        if let Some(credential) = &self.credential {
            write_credential(&token_path, credential).await.unwrap();
        }
        if let Some(contents) = &self.raw_token_file {
            std::fs::write(&token_path, contents).unwrap();
        }

        let oracle = Arc::new(self.oracle);
        let oauth = Arc::new(self.oauth);
        let provider = Arc::new(self.provider);

        let credentials = Arc::new(CredentialStore::new(token_path.clone(), oauth.clone()));
        credentials.initialize().await;

        let calendar = CalendarService::new(credentials.clone(), provider.clone(), "Asia/Jakarta");
        let assistant = self
            .assistant
            .then(|| Assistant::new(oracle.clone(), calendar.clone()));

        let mut config = Config::test_default();
        config.token_path = token_path;

        let state = Arc::new(AppState {
            config,
            assistant,
            calendar,
            credentials,
        });

        TestApp {
            router: create_router(state.clone()),
            state,
            oracle,
            oauth,
            provider,
            dir,
        }
    }
}

/// Create a test app with no stored credential.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    TestAppBuilder::new().build().await
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
