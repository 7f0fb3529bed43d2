// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitBot API Server
//!
//! Answers gym and fitness questions through Gemini and schedules confirmed
//! workouts on Google Calendar.

use fitbot::{
    config::Config,
    services::{
        Assistant, CalendarService, CredentialStore, GeminiClient, GoogleCalendarClient,
        GoogleOAuthClient,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting FitBot API");

    // Token endpoint for refresh and code exchange
    let (client_id, client_secret) = match &config.google_oauth {
        Some(oauth) => (oauth.client_id.clone(), oauth.client_secret.clone()),
        None => {
            tracing::warn!("Google OAuth client not configured, calendar login disabled");
            (String::new(), String::new())
        }
    };
    let oauth = GoogleOAuthClient::new(client_id, client_secret)
        .expect("Failed to initialize OAuth client");

    // Load any stored credential before serving
    let credentials = Arc::new(CredentialStore::new(
        config.token_path.clone(),
        Arc::new(oauth),
    ));
    let credential_state = credentials.initialize().await;
    tracing::info!(
        state = credential_state.as_str(),
        path = %config.token_path.display(),
        "Credential store initialized"
    );

    let calendar_client =
        GoogleCalendarClient::new().expect("Failed to initialize Calendar client");
    let calendar = CalendarService::new(
        credentials.clone(),
        Arc::new(calendar_client),
        config.calendar_timezone.clone(),
    );

    // Assistant is only available with a Gemini API key
    let assistant = match &config.gemini_api_key {
        Some(key) => {
            let gemini = GeminiClient::new(config.gemini_url.clone(), key.clone())
                .expect("Failed to initialize Gemini client");
            tracing::info!("FitBot assistant initialized");
            Some(Assistant::new(Arc::new(gemini), calendar.clone()))
        }
        None => {
            tracing::warn!("Gemini API key missing, assistant disabled");
            None
        }
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        assistant,
        calendar,
        credentials,
    });

    // Build router
    let app = fitbot::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitbot=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
