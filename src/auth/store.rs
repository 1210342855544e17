//! # 账户存储
//!
//! 认证核心通过 [`AccountStore`] 读取账户，只关心 id、角色、区域、状态和密码哈希。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

use entity::{UserRegions, Users, user_regions, users};

use crate::auth::types::{AccountRecord, AccountStatus, Role};
use crate::error::{Context, PortalError, Result};

/// 外部账户存储
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 按邮箱查找账户
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>>;

    /// 记录最近登录时间
    async fn record_last_seen(&self, account_id: i32, at: DateTime<Utc>) -> Result<()>;
}

/// 基于 Sea-ORM 的账户存储
#[derive(Clone)]
pub struct SeaOrmAccountStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAccountStore {
    /// 基于共享连接创建
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for SeaOrmAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        let Some(user) = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .context("查询用户失败")?
        else {
            return Ok(None);
        };

        let region_ids = UserRegions::find()
            .filter(user_regions::Column::UserId.eq(user.id))
            .all(self.db.as_ref())
            .await
            .context("查询用户区域失败")?
            .into_iter()
            .map(|membership| membership.region_id)
            .collect();

        let role: Role = user.role.parse().map_err(|e| {
            PortalError::database_with_source(format!("用户 {} 的角色无效", user.id), e)
        })?;

        Ok(Some(AccountRecord {
            id: user.id,
            email: user.email,
            role,
            status: AccountStatus::from_tag(&user.status),
            region_ids,
            password_hash: user.password_hash,
        }))
    }

    async fn record_last_seen(&self, account_id: i32, at: DateTime<Utc>) -> Result<()> {
        Users::update_many()
            .col_expr(users::Column::LastSeen, Expr::value(at.naive_utc()))
            .filter(users::Column::Id.eq(account_id))
            .exec(self.db.as_ref())
            .await
            .context("更新最近登录时间失败")?;
        Ok(())
    }
}
