//! # 会话签发
//!
//! 登录：查找账户 -> 校验口令 -> 检查状态 -> 签发令牌 -> 尽力记录最近登录时间。
//! 登出只是让客户端清掉 Cookie，服务端无状态。

use chrono::Utc;
use std::sync::Arc;

use crate::auth::credentials::SESSION_COOKIE_NAME;
use crate::auth::jwt::{SESSION_TTL_SECONDS, SessionToken, TokenService};
use crate::auth::password::PasswordVerifier;
use crate::auth::store::AccountStore;
use crate::auth::types::Claims;
use crate::error::{AuthError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, linfo, lwarn};

/// 成功登录的结果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// 签发的令牌
    pub token: SessionToken,
    /// 令牌中的声明
    pub claims: Claims,
}

/// 登录/登出流程
pub struct SessionIssuer {
    store: Arc<dyn AccountStore>,
    verifier: Arc<dyn PasswordVerifier>,
    tokens: Arc<TokenService>,
    secure_cookie: bool,
}

impl SessionIssuer {
    /// 组装登录流程，`secure_cookie` 控制 Cookie 的 `Secure` 属性
    pub fn new(
        store: Arc<dyn AccountStore>,
        verifier: Arc<dyn PasswordVerifier>,
        tokens: Arc<TokenService>,
        secure_cookie: bool,
    ) -> Self {
        Self {
            store,
            verifier,
            tokens,
            secure_cookie,
        }
    }

    /// 凭邮箱和口令登录
    ///
    /// 账户不存在与口令错误返回同一个 `InvalidCredentials`。
    pub async fn login(&self, request_id: &str, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = email.trim();

        let Some(account) = self.store.find_by_email(email).await? else {
            linfo!(
                request_id,
                LogStage::Authentication,
                LogComponent::Session,
                "login_rejected",
                "登录失败：凭证无效"
            );
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.verifier.verify(password, &account.password_hash).await? {
            linfo!(
                request_id,
                LogStage::Authentication,
                LogComponent::Session,
                "login_rejected",
                &format!("登录失败：账户 {} 口令不匹配", account.id)
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        if let Some(reason) = account.status.inactive_reason() {
            linfo!(
                request_id,
                LogStage::Authentication,
                LogComponent::Session,
                "login_inactive",
                &format!("登录失败：账户 {} 状态为 {reason}", account.id)
            );
            return Err(AuthError::AccountInactive(reason).into());
        }

        let claims = Claims::for_account(&account);
        let token = self.tokens.issue(&claims)?;

        self.touch_last_seen(request_id, account.id);

        linfo!(
            request_id,
            LogStage::Authentication,
            LogComponent::Session,
            "login_success",
            &format!("账户 {} 登录成功，角色 {}", account.id, account.role)
        );

        Ok(LoginOutcome { token, claims })
    }

    /// 后台记录最近登录时间，失败只记日志
    fn touch_last_seen(&self, request_id: &str, account_id: i32) {
        let store = Arc::clone(&self.store);
        let request_id = request_id.to_string();
        let seen_at = Utc::now();

        tokio::spawn(async move {
            match store.record_last_seen(account_id, seen_at).await {
                Ok(()) => ldebug!(
                    request_id,
                    LogStage::Db,
                    LogComponent::Session,
                    "last_seen",
                    &format!("账户 {account_id} 最近登录时间已更新")
                ),
                Err(e) => lwarn!(
                    request_id,
                    LogStage::Db,
                    LogComponent::Session,
                    "last_seen_failed",
                    &format!("账户 {account_id} 最近登录时间更新失败: {e}")
                ),
            }
        });
    }

    /// 登录成功后写入的 `Set-Cookie` 值
    #[must_use]
    pub fn session_cookie(&self, token: &SessionToken) -> String {
        self.cookie(token.as_str(), SESSION_TTL_SECONDS)
    }

    /// 登出：清除会话 Cookie，不会失败
    #[must_use]
    pub fn logout(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}={value}; Max-Age={max_age}; HttpOnly; Path=/");
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
