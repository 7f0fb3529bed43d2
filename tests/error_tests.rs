// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::extract::FromRequest;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use fitbot::error::AppError;
use fitbot::models::EventValidationError;
use fitbot::services::CalendarError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
        (
            AppError::BadRequest("days out of range".to_string()),
            StatusCode::BAD_REQUEST,
            "bad_request",
        ),
        (
            AppError::CalendarNotInitialized,
            StatusCode::FORBIDDEN,
            "calendar_not_initialized",
        ),
        (
            AppError::CalendarUnavailable,
            StatusCode::SERVICE_UNAVAILABLE,
            "calendar_unavailable",
        ),
        (
            AppError::Calendar("Error creating event: quota".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "calendar_error",
        ),
        (
            AppError::NotConfigured("no client secret".to_string()),
            StatusCode::SERVICE_UNAVAILABLE,
            "not_configured",
        ),
    ];

    for (err, status, code) in cases {
        let (actual, body) = render(err).await;
        assert_eq!(actual, status);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], code);
    }
}

#[tokio::test]
async fn test_internal_error_hides_detail() {
    let (status, body) = render(AppError::Internal(anyhow::anyhow!("disk on fire"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[test]
fn test_calendar_error_conversion() {
    assert!(matches!(
        AppError::from(CalendarError::NotInitialized),
        AppError::CalendarNotInitialized
    ));
    assert!(matches!(
        AppError::from(CalendarError::Unavailable),
        AppError::CalendarUnavailable
    ));
    assert!(matches!(
        AppError::from(CalendarError::Provider("boom".to_string())),
        AppError::Calendar(msg) if msg == "boom"
    ));
}

#[test]
fn test_validation_error_is_bad_request() {
    let err = AppError::from(EventValidationError::DurationOutOfRange(7));
    match err {
        AppError::BadRequest(msg) => assert!(msg.contains('7'), "{msg}"),
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn test_json_rejection_is_bad_request() {
    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct DurationBody {
        duration: i64,
    }

    for raw in [r#"{"duration": true}"#, r#"{"duration": "#] {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .unwrap();
        let rejection = axum::Json::<DurationBody>::from_request(request, &())
            .await
            .unwrap_err();

        let (status, body) = render(AppError::from(rejection)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "bad_request");
    }
}
