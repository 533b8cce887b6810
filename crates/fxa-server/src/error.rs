use crate::rest::INVOCATION_ID_HEADER;
use crate::types::ErrorResponse;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

// Error handling
#[derive(Debug)]
pub enum AppError {
    /// Body could not be parsed as a prompt request
    Rejection(JsonRejection),
    /// Prompt failed validation
    BadRequest(String),
    /// The agent run failed after the request was accepted
    Invocation {
        invocation_id: String,
        error: fxa_core::Error,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejection(rejection) => rejection.status(),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Invocation { error, .. } => match error {
                fxa_core::Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                e if e.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejection(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Rejection(rejection) => {
                let body = ErrorResponse {
                    error: rejection.body_text(),
                    invocation_id: None,
                };
                (status, Json(body)).into_response()
            }
            AppError::BadRequest(message) => {
                let body = ErrorResponse {
                    error: message,
                    invocation_id: None,
                };
                (status, Json(body)).into_response()
            }
            AppError::Invocation {
                invocation_id,
                error,
            } => {
                // Backend details stay in the logs
                let message = match &error {
                    fxa_core::Error::Timeout(_) => "Agent invocation timed out".to_string(),
                    e if e.is_client_error() => e.to_string(),
                    _ => "Agent invocation failed".to_string(),
                };
                let body = ErrorResponse {
                    error: message,
                    invocation_id: Some(invocation_id.clone()),
                };
                (status, [(INVOCATION_ID_HEADER, invocation_id)], Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn invocation(error: fxa_core::Error) -> AppError {
        AppError::Invocation {
            invocation_id: "inv-1".to_string(),
            error,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("empty".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            invocation(fxa_core::Error::Timeout(Duration::from_secs(60))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            invocation(fxa_core::Error::llm_error("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            invocation(fxa_core::Error::invalid_request("bad")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invocation_error_carries_header() {
        let response = invocation(fxa_core::Error::llm_error("secret backend detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[INVOCATION_ID_HEADER], "inv-1");
    }
}
