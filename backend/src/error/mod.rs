use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// JSON body every failing endpoint returns: a short human-readable message,
/// a stable machine code, and optional structured detail.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    BadRequest(String),
    /// Token past its expiry timestamp. Distinct from `TokenUsed` so public
    /// endpoints can surface the documented messages without leaking storage
    /// state beyond them.
    TokenExpired(String),
    /// Token already consumed or revoked.
    TokenUsed(String),
    Validation(Vec<String>),
    InternalServerError(anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::TokenUsed(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TokenExpired(_) => StatusCode::GONE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::TokenExpired(_) => "TOKEN_EXPIRED",
            AppError::TokenUsed(_) => "TOKEN_USED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();
        let (error, details) = match self {
            AppError::InternalServerError(err) => {
                // Log the cause; callers only ever see the generic message.
                tracing::error!("Internal server error: {:?}", err);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(errors) => (
                "Validation failed".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::TokenExpired(msg)
            | AppError::TokenUsed(msg) => (msg, None),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code,
                details,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(move |e| format!("{}: {}", field, e.code.as_ref()))
            })
            .collect();
        AppError::Validation(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn variants_map_to_status_code_and_message() {
        let cases = [
            (AppError::NotFound("missing".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Unauthorized("nope".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("denied".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT, "CONFLICT"),
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::TokenExpired("stale".into()), StatusCode::GONE, "TOKEN_EXPIRED"),
            (AppError::TokenUsed("burned".into()), StatusCode::CONFLICT, "TOKEN_USED"),
        ];
        for (error, status, code) in cases {
            let message = match &error {
                AppError::NotFound(m)
                | AppError::Unauthorized(m)
                | AppError::Forbidden(m)
                | AppError::Conflict(m)
                | AppError::BadRequest(m)
                | AppError::TokenExpired(m)
                | AppError::TokenUsed(m) => m.clone(),
                _ => unreachable!(),
            };
            let response = error.into_response();
            assert_eq!(response.status(), status);
            let json = response_json(response).await;
            assert_eq!(json["error"], message);
            assert_eq!(json["code"], code);
        }
    }

    #[tokio::test]
    async fn validation_failure_carries_per_field_details() {
        let response = AppError::Validation(vec!["password: too_short".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["errors"][0], "password: too_short");
    }

    #[tokio::test]
    async fn internal_errors_never_leak_their_cause() {
        let response =
            AppError::InternalServerError(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert!(json["details"].is_null());
        assert!(!json["error"].as_str().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));
    }
}
