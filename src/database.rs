//! # 数据库模块
//!
//! 数据库连接、迁移和引导管理员账户

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{error, info, warn};

use entity::{Users, users};

use crate::auth::{Role, hash_password};
use crate::config::DatabaseConfig;
use crate::error::{PortalError, Result};

/// 引导管理员邮箱
pub const BOOTSTRAP_ADMIN_EMAIL_ENV: &str = "CLUSTER_BOOTSTRAP_ADMIN_EMAIL";
/// 引导管理员口令
pub const BOOTSTRAP_ADMIN_PASSWORD_ENV: &str = "CLUSTER_BOOTSTRAP_ADMIN_PASSWORD";

/// 初始化数据库连接
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    info!("正在连接数据库: {}", loggable_url(&config.url));

    config.ensure_database_path()?;

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    // 内存库每个连接都是独立的数据库，只能保留一个
    if config.is_memory_database() {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options)
        .await
        .map_err(|e| PortalError::database_with_source("数据库连接失败", e))?;

    info!("数据库连接成功");
    Ok(db)
}

/// 去掉连接串中的账户信息和查询参数，仅用于日志
fn loggable_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.chars().take(50).collect();
    };

    let authority_end = rest.find('/').unwrap_or(rest.len());
    let rest = rest[..authority_end]
        .rfind('@')
        .map_or(rest, |at| &rest[at + 1..]);
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);

    format!("{scheme}://{}", rest.chars().take(50).collect::<String>())
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    info!("开始运行数据库迁移...");

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            info!("数据库迁移完成");
            Ok(())
        }
        Err(e) => {
            error!("数据库迁移失败: {}", e);
            Err(PortalError::database_with_source("数据库迁移失败", e))
        }
    }
}

/// 按环境变量创建引导管理员
///
/// 两个变量都设置且该邮箱尚无账户时才创建。
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> Result<()> {
    let email = std::env::var(BOOTSTRAP_ADMIN_EMAIL_ENV).ok();
    let password = std::env::var(BOOTSTRAP_ADMIN_PASSWORD_ENV).ok();

    match (email, password) {
        (Some(email), Some(password)) => {
            let created = create_admin_if_absent(db, &email, &password).await?;
            if created {
                info!("已创建引导管理员账户: {}", email.trim());
            }
            Ok(())
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!(
                "{} 与 {} 需要同时设置，跳过引导管理员创建",
                BOOTSTRAP_ADMIN_EMAIL_ENV, BOOTSTRAP_ADMIN_PASSWORD_ENV
            );
            Ok(())
        }
        (None, None) => Ok(()),
    }
}

/// 账户不存在时创建一个 `admin`/`active` 账户，返回是否创建
pub async fn create_admin_if_absent(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<bool> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(PortalError::config("引导管理员的邮箱和口令不能为空"));
    }

    let existing = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| PortalError::database_with_source("查询用户失败", e))?;
    if existing.is_some() {
        return Ok(false);
    }

    let password_hash = {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| PortalError::internal_with_source("密码哈希任务失败", e))??
    };

    users::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(Role::Admin.as_str().to_string()),
        status: Set("active".to_string()),
        last_seen: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| PortalError::database_with_source("创建引导管理员失败", e))?;

    Ok(true)
}
