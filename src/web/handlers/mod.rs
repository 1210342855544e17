//! # 请求处理器

pub mod auth;
pub mod pages;
pub mod sites;
pub mod system;
