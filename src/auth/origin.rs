//! # 来源策略
//!
//! 两级判定：先精确匹配固定列表，再依次匹配正则模式。
//! 纯函数，无内部状态，启动时构建一次。

use axum::http::{HeaderMap, header};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::config::CorsConfig;
use crate::error::{PortalError, Result};

/// 对请求来源的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// 允许，携带需要回显的来源
    Allowed(String),
    /// 拒绝：不输出任何 CORS 允许头
    Rejected,
}

impl OriginDecision {
    /// 允许时返回回显的来源
    #[must_use]
    pub fn allowed_origin(&self) -> Option<&str> {
        match self {
            Self::Allowed(origin) => Some(origin),
            Self::Rejected => None,
        }
    }

    /// 是否允许
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// 跨域来源策略
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    /// 精确匹配的来源
    exact: HashSet<String>,
    /// 按顺序尝试的模式
    patterns: Vec<Regex>,
}

impl OriginPolicy {
    /// 从字符串列表创建，模式无法编译即报错
    pub fn new<E, P>(exact: E, patterns: P) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: Into<String>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let exact = exact.into_iter().map(Into::into).collect();
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| {
                    PortalError::config_with_source(format!("无效的来源匹配模式: {pattern}"), e)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { exact, patterns })
    }

    /// 从 CORS 配置创建
    pub fn from_config(config: &CorsConfig) -> Result<Self> {
        Self::new(
            config.allowed_origins.iter().cloned(),
            config.allowed_origin_patterns.iter(),
        )
    }

    /// 来源是否允许；没有来源一律不允许
    #[must_use]
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
            return false;
        };

        if self.exact.contains(origin) {
            debug!("origin {} matched exact allowlist", origin);
            return true;
        }

        if let Some(pattern) = self.patterns.iter().find(|p| p.is_match(origin)) {
            debug!("origin {} matched pattern {}", origin, pattern.as_str());
            return true;
        }

        debug!("origin {} is not allowed", origin);
        false
    }

    /// 解析来源，允许时返回需要回显的值
    #[must_use]
    pub fn resolve(&self, origin: Option<&str>) -> OriginDecision {
        match origin {
            Some(origin) if self.is_allowed(Some(origin)) => {
                OriginDecision::Allowed(origin.trim().to_string())
            }
            _ => OriginDecision::Rejected,
        }
    }

    /// 读取请求的 `Origin` 头并解析
    #[must_use]
    pub fn evaluate(&self, headers: &HeaderMap) -> OriginDecision {
        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());
        self.resolve(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn default_policy() -> OriginPolicy {
        OriginPolicy::from_config(&CorsConfig::default()).unwrap()
    }

    #[rstest]
    #[case("https://cluster.ne")]
    #[case("https://app.cluster.ne")]
    #[case("capacitor://localhost")]
    #[case("ionic://localhost")]
    #[case("http://localhost:5173")]
    #[case("http://localhost")]
    #[case("https://127.0.0.1:8443")]
    #[case("capacitor://localhost:8100")]
    fn test_allowed_origins(#[case] origin: &str) {
        let policy = default_policy();
        assert!(policy.is_allowed(Some(origin)));
        assert_eq!(
            policy.resolve(Some(origin)),
            OriginDecision::Allowed(origin.to_string())
        );
    }

    #[rstest]
    #[case("https://evil.example")]
    #[case("http://cluster.ne")]
    #[case("https://cluster.ne.evil.example")]
    #[case("http://localhost.evil.example")]
    #[case("http://localhost:5173/")]
    #[case("null")]
    #[case("")]
    fn test_rejected_origins(#[case] origin: &str) {
        let policy = default_policy();
        assert!(!policy.is_allowed(Some(origin)));
        assert_eq!(policy.resolve(Some(origin)), OriginDecision::Rejected);
    }

    #[test]
    fn test_missing_origin_is_never_allowed() {
        let policy = default_policy();
        assert!(!policy.is_allowed(None));
        assert_eq!(policy.resolve(None), OriginDecision::Rejected);
        assert_eq!(policy.evaluate(&HeaderMap::new()), OriginDecision::Rejected);
    }

    #[test]
    fn test_exact_only_policy() {
        let policy = OriginPolicy::new(["https://ops.cluster.ne"], Vec::<String>::new()).unwrap();
        assert!(policy.is_allowed(Some("https://ops.cluster.ne")));
        assert!(!policy.is_allowed(Some("http://localhost:3000")));
    }

    #[test]
    fn test_invalid_pattern_fails() {
        let result = OriginPolicy::new(Vec::<String>::new(), ["^(broken"]);
        assert!(matches!(result, Err(PortalError::Config { .. })));
    }
}
