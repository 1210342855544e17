//! # 应用配置结构定义

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::DatabaseConfig;

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 监听配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 会话 Cookie 配置
    #[serde(default)]
    pub session: SessionConfig,
    /// 跨域来源配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 静态资源目录
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 会话配置
///
/// 令牌有效期固定为 8 小时，不在此处配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 是否为会话 Cookie 添加 `Secure` 属性（TLS 部署必须开启）
    #[serde(default)]
    pub secure_cookie: bool,
}

/// CORS 配置：精确列表 + 正则模式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 精确匹配的生产/应用来源
    pub allowed_origins: Vec<String>,
    /// 本地开发与内嵌 WebView 使用的来源模式
    pub allowed_origin_patterns: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://cluster.ne".to_string(),
                "https://www.cluster.ne".to_string(),
                "https://app.cluster.ne".to_string(),
                "capacitor://localhost".to_string(),
                "ionic://localhost".to_string(),
            ],
            allowed_origin_patterns: vec![
                r"^https?://localhost(:\d+)?$".to_string(),
                r"^https?://127\.0\.0\.1(:\d+)?$".to_string(),
                r"^capacitor://localhost(:\d+)?$".to_string(),
            ],
        }
    }
}

/// 静态资源配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    /// 前端页面目录（SPA，未命中时回退到 index.html）
    #[serde(default)]
    pub public_dir: Option<PathBuf>,
    /// 公开图片目录，挂载在 `/images`
    #[serde(default)]
    pub images_dir: Option<PathBuf>,
}
