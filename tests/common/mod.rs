//! 集成测试共享夹具：内存 SQLite + 已迁移的表 + 固定账户与站点

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use cluster_access::auth::{Claims, Role, SessionToken};
use cluster_access::config::{AppConfig, DatabaseConfig, SigningSecret};
use cluster_access::database;
use cluster_access::web::{AppState, create_router};
use entity::{sites, user_regions, users};

pub const ADMIN_EMAIL: &str = "admin@cluster.ne";
pub const ADMIN_PASSWORD: &str = "AdminCluster2025!";
pub const MANAGER_EMAIL: &str = "rm@cluster.ne";
pub const AGENT_EMAIL: &str = "agent@cluster.ne";
pub const SUSPENDED_EMAIL: &str = "suspendu@cluster.ne";
pub const INACTIVE_EMAIL: &str = "inactif@cluster.ne";
pub const BROKEN_ROLE_EMAIL: &str = "broken@cluster.ne";
pub const SHARED_PASSWORD: &str = "Terrain2025!";

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Arc<DatabaseConnection>,
    pub images_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let images_dir = tempfile::tempdir().unwrap();
        std::fs::write(images_dir.path().join("logo.png"), b"\x89PNG fake").unwrap();

        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connect_timeout: 5,
        };
        config.static_files.images_dir = Some(images_dir.path().to_path_buf());
        customize(&mut config);

        let db = database::init_database(&config.database).await.unwrap();
        database::run_migrations(&db).await.unwrap();
        seed(&db).await;

        let db = Arc::new(db);
        let secret = SigningSecret::from_value(Some(TEST_SECRET.to_string())).unwrap();
        let state = AppState::new(Arc::new(config), Arc::clone(&db), &secret).unwrap();
        let router = create_router(state.clone());

        Self {
            router,
            state,
            db,
            images_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn token_for(&self, claims: &Claims) -> SessionToken {
        self.state.tokens().issue(claims).unwrap()
    }

    pub fn expired_token_for(&self, claims: &Claims) -> SessionToken {
        self.state
            .tokens()
            .issue_at(claims, Utc::now() - Duration::hours(9), Duration::hours(8))
            .unwrap()
    }

    pub fn images_path(&self) -> &Path {
        self.images_dir.path()
    }
}

pub fn admin_claims() -> Claims {
    Claims::new(1, Role::Admin, [], ADMIN_EMAIL)
}

pub fn manager_claims() -> Claims {
    Claims::new(2, Role::RegionalManager, [2, 5], MANAGER_EMAIL)
}

pub fn agent_claims() -> Claims {
    Claims::new(7, Role::FieldAgent, [3], AGENT_EMAIL)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, token: &SessionToken) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("token={}", token.as_str()))
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(uri: &str, token: &SessionToken) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token.as_str()))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn header_str<'a>(response: &'a Response<Body>, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

async fn insert_user(db: &DatabaseConnection, id: i32, email: &str, password: &str, role: &str, status: &str) {
    users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        password_hash: Set(bcrypt::hash(password, 4).unwrap()),
        role: Set(role.to_string()),
        status: Set(status.to_string()),
        last_seen: Set(None),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap();
}

async fn insert_site(db: &DatabaseConnection, id: i32, region_id: Option<i32>, created_by: i32) {
    sites::ActiveModel {
        id: Set(id),
        name: Set(format!("Site {id}")),
        region_id: Set(region_id),
        created_by: Set(created_by),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap();
}

/// 账户：1 管理员，2 区域经理 {2,5}，7 外勤，8 停用，9 未激活，10 角色无效
/// 站点：1(r2,u7) 2(r5,u1) 3(r3,u7) 4(无区域,u1) 5(r3,u2)
async fn seed(db: &DatabaseConnection) {
    insert_user(db, 1, ADMIN_EMAIL, ADMIN_PASSWORD, "admin", "active").await;
    insert_user(db, 2, MANAGER_EMAIL, SHARED_PASSWORD, "regional_manager", "actif").await;
    insert_user(db, 7, AGENT_EMAIL, SHARED_PASSWORD, "field_agent", "active").await;
    insert_user(db, 8, SUSPENDED_EMAIL, SHARED_PASSWORD, "field_agent", "suspendu").await;
    insert_user(db, 9, INACTIVE_EMAIL, SHARED_PASSWORD, "field_agent", "inactif").await;
    insert_user(db, 10, BROKEN_ROLE_EMAIL, SHARED_PASSWORD, "superuser", "active").await;

    for (id, region_id) in [(1, 2), (2, 5)] {
        user_regions::ActiveModel {
            id: Set(id),
            user_id: Set(2),
            region_id: Set(region_id),
        }
        .insert(db)
        .await
        .unwrap();
    }

    insert_site(db, 1, Some(2), 7).await;
    insert_site(db, 2, Some(5), 1).await;
    insert_site(db, 3, Some(3), 7).await;
    insert_site(db, 4, None, 1).await;
    insert_site(db, 5, Some(3), 2).await;
}
