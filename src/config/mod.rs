//! # 配置管理模块
//!
//! 处理应用配置加载、验证和签名密钥读取

mod app_config;
mod database;
mod manager;
mod secret;

pub use app_config::{AppConfig, CorsConfig, ServerConfig, SessionConfig, StaticFilesConfig};
pub use database::DatabaseConfig;
pub use manager::{CONFIG_PATH_ENV, ConfigManager, ConfigSource};
pub use secret::{SIGNING_SECRET_ENV, SigningSecret};

use crate::ensure_config;
use crate::error::{PortalError, Result};

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<()> {
    ensure_config!(
        config.server.port != 0,
        "无效的服务器端口: {}",
        config.server.port
    );
    ensure_config!(
        !config.server.host.trim().is_empty(),
        "服务器监听地址不能为空"
    );
    ensure_config!(!config.database.url.is_empty(), "数据库URL不能为空");
    ensure_config!(
        config.database.max_connections > 0,
        "数据库最大连接数必须大于0"
    );

    for origin in &config.cors.allowed_origins {
        if origin == "*" {
            return Err(PortalError::config(
                "允许来源列表不能包含通配符 *，请逐个列出",
            ));
        }
        if origin.ends_with('/') {
            return Err(PortalError::config(format!(
                "允许来源不能以 / 结尾: {origin}"
            )));
        }
    }

    for pattern in &config.cors.allowed_origin_patterns {
        regex::Regex::new(pattern).map_err(|e| {
            PortalError::config_with_source(format!("无效的来源匹配模式: {pattern}"), e)
        })?;
    }

    Ok(())
}
