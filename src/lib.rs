//! # Cluster Access
//!
//! 外勤作业门户的访问控制核心：会话令牌、凭证提取、来源策略、
//! 请求闸门、数据可见范围和登录流程

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AuthError, PortalError, Result};
