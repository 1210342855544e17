//! # API 响应
//!
//! 所有错误到 HTTP 的映射都集中在这里。401 的响应体是通用的，
//! 不区分令牌过期和令牌无效。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{AuthError, PortalError};

/// 通用 401 文案
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
/// 通用 500 文案
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API 响应
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    /// 200 + 数据体
    Success(T),
    /// 200 + `{"message": ...}`
    Message(String),
    /// 指定状态码 + `{"error": ...}`
    Error(StatusCode, String),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Self::Message(message) => {
                (StatusCode::OK, Json(json!({ "message": message }))).into_response()
            }
            Self::Error(status, message) => error_body(status, &message),
        }
    }
}

/// `{"error": message}`
#[must_use]
pub fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::MissingCredentials | Self::TokenExpired | Self::TokenInvalid => {
                UNAUTHORIZED_MESSAGE
            }
            Self::InvalidCredentials => "Invalid credentials",
            Self::AccountInactive(reason) => reason.localized_message(),
            Self::OriginRejected => "Forbidden",
            Self::InsufficientScope => "Not found",
        };
        error_body(status, message)
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(error) => error.into_response(),
            other => {
                let (status, code) = other.to_http_response_parts();
                tracing::error!(code, "request failed: {:?}", other);
                error_body(status, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
