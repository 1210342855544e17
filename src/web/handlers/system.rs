//! # 系统处理器

/// `GET /api/ping`
pub async fn ping_handler() -> &'static str {
    "pong"
}
