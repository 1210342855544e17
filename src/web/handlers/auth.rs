//! # 认证处理器
//!
//! 登录、登出和当前会话

use axum::Form;
use axum::extract::{FromRequest, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::error::PortalError;
use crate::logging::{LogComponent, LogStage};
use crate::web::extract::Authenticated;
use crate::web::middleware::RequestId;
use crate::web::response::{ApiResponse, error_body};
use crate::web::server::AppState;
use crate::{internal_error, lerror, lwarn};

/// 移动端在响应体中额外获取令牌
const MOBILE_CLIENT: &str = "mobile";

/// 登录请求
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// 登录邮箱
    pub email: Option<String>,
    /// 明文口令
    pub password: Option<String>,
    /// 客户端类型，`mobile` 时令牌也放在响应体中
    pub client: Option<String>,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// 结果说明
    pub message: &'static str,
    /// 仅移动端返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `POST /api/auth/login`
///
/// 接受 JSON 或 HTML 表单提交的请求体
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Request,
) -> Response {
    let request = match parse_login_request(body).await {
        Ok(request) => request,
        Err(rejection) => {
            lwarn!(
                &request_id,
                LogStage::Authentication,
                LogComponent::Session,
                "login_bad_request",
                &format!("登录请求体无法解析: {rejection}")
            );
            return missing_fields();
        }
    };

    let (Some(email), Some(password)) = (
        request.email.filter(|e| !e.trim().is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return missing_fields();
    };

    let outcome = match state.sessions().login(&request_id, &email, &password).await {
        Ok(outcome) => outcome,
        Err(PortalError::Auth(error)) => return error.into_response(),
        Err(error) => {
            lerror!(
                &request_id,
                LogStage::Authentication,
                LogComponent::Session,
                "login_failed",
                &format!("登录过程出错: {error:?}")
            );
            return error.into_response();
        }
    };

    let cookie = state.sessions().session_cookie(&outcome.token);
    let Ok(cookie) = HeaderValue::from_str(&cookie) else {
        return internal_error!("会话 Cookie 无法编码").into_response();
    };

    let token = (request.client.as_deref() == Some(MOBILE_CLIENT))
        .then(|| outcome.token.into_string());

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful",
            token,
        }),
    )
        .into_response()
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = state.sessions().logout();
    match HeaderValue::from_str(&cookie) {
        Ok(cookie) => (
            [(header::SET_COOKIE, cookie)],
            ApiResponse::<()>::Message("Logout successful".to_string()),
        )
            .into_response(),
        Err(e) => PortalError::internal_with_source("会话 Cookie 无法编码", e).into_response(),
    }
}

/// `GET /api/auth/me`
pub async fn me(Authenticated(claims): Authenticated) -> Response {
    ApiResponse::Success(claims).into_response()
}

/// 按 Content-Type 选择表单或 JSON 解析
async fn parse_login_request(body: Request) -> Result<LoginRequest, String> {
    let is_form = body
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });

    if is_form {
        Form::<LoginRequest>::from_request(body, &())
            .await
            .map(|Form(request)| request)
            .map_err(|rejection| rejection.body_text())
    } else {
        Json::<LoginRequest>::from_request(body, &())
            .await
            .map(|Json(request)| request)
            .map_err(|rejection| rejection.body_text())
    }
}

fn missing_fields() -> Response {
    error_body(StatusCode::BAD_REQUEST, "Email and password are required")
}
