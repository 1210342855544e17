//! # HTTP 服务器
//!
//! 组装应用状态和路由，启动监听并在 Ctrl+C 时优雅退出。

use axum::Router;
use axum::routing::get;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::pages;
use super::middleware::{request_gate, request_id_middleware};
use crate::auth::{BcryptVerifier, OriginPolicy, SeaOrmAccountStore, SessionIssuer, TokenService};
use crate::config::{AppConfig, SigningSecret};
use crate::error::{PortalError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

/// 应用状态：启动时构建，之后只读
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    database: Arc<DatabaseConnection>,
    tokens: Arc<TokenService>,
    origins: Arc<OriginPolicy>,
    sessions: Arc<SessionIssuer>,
}

impl AppState {
    /// 由配置、数据库连接和签名密钥构建
    pub fn new(
        config: Arc<AppConfig>,
        database: Arc<DatabaseConnection>,
        secret: &SigningSecret,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenService::new(secret));
        let origins = Arc::new(OriginPolicy::from_config(&config.cors)?);
        let sessions = Arc::new(SessionIssuer::new(
            Arc::new(SeaOrmAccountStore::new(Arc::clone(&database))),
            Arc::new(BcryptVerifier),
            Arc::clone(&tokens),
            config.session.secure_cookie,
        ));

        Ok(Self {
            config,
            database,
            tokens,
            origins,
            sessions,
        })
    }

    /// 应用配置
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 数据库连接
    #[must_use]
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// 令牌服务
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// 来源策略
    #[must_use]
    pub fn origins(&self) -> &OriginPolicy {
        &self.origins
    }

    /// 登录流程
    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }
}

/// 创建路由器
///
/// 中间件顺序（外到内）：Trace -> Request ID -> 请求闸门 -> 处理器
pub fn create_router(state: AppState) -> Router {
    let static_files = &state.config().static_files;

    let mut app = Router::new().nest("/api", super::routes::create_api_routes());

    if let Some(images_dir) = &static_files.images_dir {
        app = app.nest_service("/images", ServeDir::new(images_dir));
    }

    if let Some(public_dir) = &static_files.public_dir {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "static_service_enabled",
            &format!("Enabling static file service from {}", public_dir.display())
        );
        // SPA 回退到 index.html
        app = app.fallback_service(
            ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html"))),
        );
    } else {
        app = app
            .route("/", get(pages::index))
            .route(super::middleware::LOGIN_PATH, get(pages::login_page))
            .route(super::middleware::DASHBOARD_PATH, get(pages::dashboard))
            .fallback(pages::not_found);
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                request_gate,
            )),
    )
    .with_state(state)
}

/// 启动服务器
pub async fn serve(state: AppState) -> Result<()> {
    let server = &state.config().server;
    let bind_address = format!("{}:{}", server.host, server.port);
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        PortalError::config_with_source(format!("Invalid bind address '{bind_address}'"), e)
    })?;

    let listener = TcpListener::bind(addr).await?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::ServerSetup,
        "server_start",
        &format!("Listening on {addr}")
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PortalError::internal_with_source("HTTP server error", e))?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::ServerSetup,
        "server_stopped",
        "HTTP server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
