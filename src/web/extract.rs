//! # 请求提取器

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::Claims;
use crate::error::AuthError;

/// 已认证调用方的声明
///
/// 声明由请求闸门附加；没有声明时以通用 401 拒绝。
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Self)
            .ok_or(AuthError::MissingCredentials)
    }
}
