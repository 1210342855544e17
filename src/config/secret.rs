//! # 签名密钥
//!
//! 会话令牌的 HMAC 密钥只在进程启动时从部署环境读取一次。
//! 未配置即启动失败，没有任何内置默认值。

use std::fmt;
use std::sync::Arc;

use crate::error::{PortalError, Result};

/// 读取签名密钥的环境变量名
pub const SIGNING_SECRET_ENV: &str = "JWT_SECRET";

/// 低于该长度只告警，不拒绝
const RECOMMENDED_MIN_LEN: usize = 32;

/// 进程级、不可变的签名密钥
#[derive(Clone)]
pub struct SigningSecret(Arc<str>);

impl SigningSecret {
    /// 从 `JWT_SECRET` 读取
    pub fn from_env() -> Result<Self> {
        Self::from_value(std::env::var(SIGNING_SECRET_ENV).ok())
    }

    /// 从可选值构造；缺失或空白即为致命配置错误
    pub fn from_value(value: Option<String>) -> Result<Self> {
        let Some(value) = value else {
            return Err(PortalError::config(format!(
                "未配置会话签名密钥，请设置环境变量 {SIGNING_SECRET_ENV}"
            )));
        };

        if value.trim().is_empty() {
            return Err(PortalError::config(format!(
                "会话签名密钥为空，请设置环境变量 {SIGNING_SECRET_ENV}"
            )));
        }

        if value.len() < RECOMMENDED_MIN_LEN {
            tracing::warn!(
                "signing secret is shorter than {} bytes; use a longer random value in production",
                RECOMMENDED_MIN_LEN
            );
        }

        Ok(Self(Arc::from(value)))
    }

    /// 原始密钥字节
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(***)")
    }
}
