//! # Web 层
//!
//! 请求闸门、处理器与服务器组装

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;

pub use extract::Authenticated;
pub use server::{AppState, create_router, serve};
