//! # 密码校验
//!
//! bcrypt 校验是登录流程中唯一刻意放慢的步骤，放在阻塞线程池中执行。

use async_trait::async_trait;

use crate::error::{PortalError, Result};

/// 口令校验能力：`verify(plaintext, hash) -> bool`
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// 校验明文口令是否与存储的哈希匹配
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool>;
}

/// 基于 bcrypt 的校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

#[async_trait]
impl PasswordVerifier for BcryptVerifier {
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
            .await
            .map_err(|e| PortalError::internal_with_source("密码校验任务失败", e))?;

        match outcome {
            Ok(matched) => Ok(matched),
            Err(e) => {
                // 存储的哈希格式损坏按不匹配处理
                tracing::warn!("stored password hash could not be parsed: {}", e);
                Ok(false)
            }
        }
    }
}

/// 生成 bcrypt 哈希（用于引导管理员账户）
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
        .map_err(|e| PortalError::internal_with_source("密码哈希失败", e))
}
