//! # 配置管理器
//!
//! 文件加载 + `CLUSTER_*` 环境变量覆盖 + 校验。进程启动时加载一次，运行期间不再变化。

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{AppConfig, validate_config};
use crate::error::{PortalError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

/// 环境变量前缀
const ENV_PREFIX: &str = "CLUSTER_";

/// 显式指定配置文件的环境变量
pub const CONFIG_PATH_ENV: &str = "CLUSTER_CONFIG_PATH";

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// 从文件读取
    File(PathBuf),
    /// 默认配置文件不存在，使用内置默认值
    Defaults,
}

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<AppConfig>,
    source: ConfigSource,
}

impl ConfigManager {
    /// 按优先级定位配置文件并加载
    ///
    /// 1. 命令行显式路径
    /// 2. `CLUSTER_CONFIG_PATH`
    /// 3. `config/config.{RUST_ENV}.toml`（不存在时使用默认值）
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let overrides = Self::build_env_overrides(env::vars());

        if let Some(path) = explicit_path {
            return Self::from_file(path, &overrides);
        }

        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&path), &overrides);
        }

        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let default_path = PathBuf::from(format!("config/config.{env_name}.toml"));
        if default_path.exists() {
            return Self::from_file(&default_path, &overrides);
        }

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Config,
            "use_defaults",
            &format!("配置文件 {} 不存在，使用默认配置", default_path.display())
        );
        Self::from_parts(AppConfig::default(), ConfigSource::Defaults, &overrides)
    }

    /// 从指定文件加载；文件必须存在
    pub fn from_file(path: &Path, overrides: &HashMap<String, String>) -> Result<Self> {
        let config = Self::load_config_file(path)?;
        Self::from_parts(config, ConfigSource::File(path.to_path_buf()), overrides)
    }

    /// 应用覆盖并校验
    pub fn from_parts(
        mut config: AppConfig,
        source: ConfigSource,
        overrides: &HashMap<String, String>,
    ) -> Result<Self> {
        Self::apply_env_overrides(&mut config, overrides)?;
        validate_config(&config)?;

        Ok(Self {
            config: Arc::new(config),
            source,
        })
    }

    /// 当前配置
    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// 配置来源
    #[must_use]
    pub const fn source(&self) -> &ConfigSource {
        &self.source
    }

    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(PortalError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let config_content = std::fs::read_to_string(path).map_err(|e| {
            PortalError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        toml::from_str(&config_content).map_err(|e| {
            PortalError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}, 详细错误: {e}", path.display()),
                e,
            )
        })
    }

    /// 构建环境变量覆盖映射
    ///
    /// `CLUSTER_SERVER_PORT` -> `server.port`
    pub fn build_env_overrides<I>(vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = HashMap::new();

        for (key, value) in vars {
            if key == CONFIG_PATH_ENV {
                continue;
            }
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_path = config_key.to_lowercase().replace('_', ".");
                // 引导管理员账号由数据库层单独读取
                if config_path.starts_with("bootstrap.") {
                    continue;
                }
                overrides.insert(config_path, value);
            }
        }

        debug!("发现 {} 个环境变量覆盖", overrides.len());
        overrides
    }

    fn apply_env_overrides(config: &mut AppConfig, overrides: &HashMap<String, String>) -> Result<()> {
        for (path, value) in overrides {
            debug!(
                "应用环境变量覆盖: {} = {}",
                path,
                if path.contains("url") { "***" } else { value }
            );

            Self::apply_override_to_config(config, path, value)?;
        }
        Ok(())
    }

    fn apply_override_to_config(config: &mut AppConfig, path: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => config.server.host = value.to_string(),
            ["server", "port"] => {
                config.server.port = value.parse().map_err(|e| {
                    PortalError::config_with_source(format!("无效的端口号: {value}"), e)
                })?;
            }
            ["database", "url"] => config.database.url = value.to_string(),
            ["database", "max", "connections"] => {
                config.database.max_connections = value.parse().map_err(|e| {
                    PortalError::config_with_source(format!("无效的最大连接数: {value}"), e)
                })?;
            }
            ["session", "secure", "cookie"] => {
                config.session.secure_cookie = parse_flag(value)?;
            }
            ["cors", "allowed", "origins"] => {
                config.cors.allowed_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }
            ["static", "public", "dir"] => config.static_files.public_dir = Some(value.into()),
            ["static", "images", "dir"] => config.static_files.images_dir = Some(value.into()),
            _ => {
                warn!("未知的配置路径，忽略环境变量覆盖: {}", path);
            }
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PortalError::config(format!("无效的布尔值: {other}"))),
    }
}
