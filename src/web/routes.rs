//! # 路由配置

use axum::Router;
use axum::routing::{get, post};

use super::handlers::{auth, sites, system};
use super::server::AppState;

/// 挂载在 `/api` 下的路由
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(system::ping_handler))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/sites", get(sites::list_sites))
        .route("/sites/count", get(sites::count_sites))
        .route("/sites/{id}", get(sites::get_site))
}
