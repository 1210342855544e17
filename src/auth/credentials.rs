//! # 凭证提取
//!
//! 浏览器客户端使用 HttpOnly Cookie，内嵌/移动客户端使用 Bearer 头。
//! 先看 Cookie，再看 `Authorization: Bearer`，不查询其他来源。

use axum::http::{HeaderMap, header};

/// 会话 Cookie 名
pub const SESSION_COOKIE_NAME: &str = "token";

/// 凭证来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    Bearer,
}

impl CredentialSource {
    /// 日志用名称
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cookie => "cookie",
            Self::Bearer => "bearer",
        }
    }
}

/// 从请求中取出的原始令牌
#[derive(Clone, PartialEq, Eq)]
pub struct RawCredential {
    token: String,
    source: CredentialSource,
}

impl RawCredential {
    /// 原始令牌
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// 令牌来源
    #[must_use]
    pub const fn source(&self) -> CredentialSource {
        self.source
    }
}

impl std::fmt::Debug for RawCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawCredential")
            .field("token", &crate::logging::sanitize_token(&self.token))
            .field("source", &self.source)
            .finish()
    }
}

/// 凭证提取器
pub struct CredentialExtractor;

impl CredentialExtractor {
    /// 按固定优先级提取原始令牌
    #[must_use]
    pub fn extract(headers: &HeaderMap) -> Option<RawCredential> {
        if let Some(token) = Self::extract_cookie_token(headers) {
            return Some(RawCredential {
                token,
                source: CredentialSource::Cookie,
            });
        }

        Self::extract_bearer_token(headers).map(|token| RawCredential {
            token,
            source: CredentialSource::Bearer,
        })
    }

    /// 从 `Cookie` 头中提取会话令牌，空值视为不存在
    #[must_use]
    pub fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    }

    /// 从 `Authorization: Bearer <token>` 中提取令牌
    #[must_use]
    pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}
