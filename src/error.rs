use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// JSON body every API endpoint answers with on failure (and most on success).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self {
            // detail stays server-side
            error!(error = ?e, "request failed");
        }
        (self.status(), Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

/// JSON body extractor whose failures (bad syntax, wrong field types,
/// missing content type) answer 400 with a `{message}` body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), "unreadable request body");
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_their_detail() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::Validation("All fields are required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "All fields are required");
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[derive(serde::Deserialize)]
    struct Count {
        #[allow(dead_code)]
        n: u32,
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<(), AppError> {
        let mut req = axum::http::Request::post("/");
        if let Some(ct) = content_type {
            req = req.header(axum::http::header::CONTENT_TYPE, ct);
        }
        let req = req.body(axum::body::Body::from(body)).unwrap();
        AppJson::<Count>::from_request(req, &()).await.map(|_| ())
    }

    #[tokio::test]
    async fn unreadable_bodies_become_validation_errors() {
        assert!(extract(Some("application/json"), r#"{"n": 3}"#).await.is_ok());

        for (ct, body) in [
            (Some("application/json"), r#"{"n": "three"}"#),
            (Some("application/json"), "{"),
            (Some("application/x-www-form-urlencoded"), "n=3"),
            (None, r#"{"n": 3}"#),
        ] {
            let err = extract(ct, body).await.err().expect("rejected");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{ct:?} {body}");
            assert!(matches!(err, AppError::Validation(ref m) if !m.is_empty()));
        }
    }
}
