//! 请求闸门：CORS、页面重定向、图片资源和 API 认证

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;

fn preflight(uri: &str, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET");
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn preflight_from_local_dev_origin_is_allowed() {
    let app = TestApp::new().await;

    let response = app
        .send(preflight("/api/sites", Some("http://localhost:5173")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("http://localhost:5173")
    );
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
        Some("true")
    );
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_ALLOW_METHODS),
        Some("GET, POST, PUT, DELETE, OPTIONS")
    );
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_ALLOW_HEADERS),
        Some("Content-Type, Authorization, Cookie")
    );
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_MAX_AGE),
        Some("86400")
    );
    assert_eq!(header_str(&response, header::VARY), Some("Origin"));
}

#[tokio::test]
async fn preflight_is_always_ok_with_vary() {
    let app = TestApp::new().await;

    for origin in [
        Some("https://evil.example"),
        Some("https://cluster.ne"),
        Some("capacitor://localhost"),
        None,
    ] {
        let response = app.send(preflight("/api/auth/login", origin)).await;
        assert_eq!(response.status(), StatusCode::OK, "{origin:?}");
        assert_eq!(header_str(&response, header::VARY), Some("Origin"), "{origin:?}");
    }
}

#[tokio::test]
async fn preflight_from_unknown_origin_has_no_allow_headers() {
    let app = TestApp::new().await;

    let response = app
        .send(preflight("/api/sites", Some("https://evil.example")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).is_none());
    assert!(response.headers().get(header::ACCESS_CONTROL_MAX_AGE).is_none());
}

#[tokio::test]
async fn unknown_origin_gets_no_cors_even_with_valid_token() {
    let app = TestApp::new().await;
    let token = app.token_for(&admin_claims());

    let request = Request::builder()
        .uri("/api/sites")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::COOKIE, format!("token={}", token.as_str()))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::VARY), Some("Origin"));
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn allowed_origin_is_echoed_on_real_requests() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/api/ping")
        .header(header::ORIGIN, "https://app.cluster.ne")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("https://app.cluster.ne")
    );
    assert_eq!(
        header_str(&response, header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
        Some("true")
    );
    assert_eq!(header_str(&response, header::VARY), Some("Origin"));
    assert!(response.headers().get(header::ACCESS_CONTROL_MAX_AGE).is_none());
}

#[tokio::test]
async fn configured_origin_list_replaces_defaults() {
    let app = TestApp::with_config(|config| {
        config.cors.allowed_origins = vec!["https://ops.cluster.ne".to_string()];
        config.cors.allowed_origin_patterns.clear();
    })
    .await;

    let allowed = app
        .send(preflight("/api/sites", Some("https://ops.cluster.ne")))
        .await;
    assert_eq!(
        header_str(&allowed, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("https://ops.cluster.ne")
    );

    let local = app
        .send(preflight("/api/sites", Some("http://localhost:5173")))
        .await;
    assert!(local.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn dashboard_without_credentials_redirects_to_login() {
    let app = TestApp::new().await;

    let response = app.send(get("/dashboard")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_str(&response, header::LOCATION), Some("/login"));
}

#[tokio::test]
async fn dashboard_with_expired_or_forged_token_redirects() {
    let app = TestApp::new().await;

    let expired = app.expired_token_for(&admin_claims());
    let response = app.send(get_with_cookie("/dashboard", &expired)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_str(&response, header::LOCATION), Some("/login"));

    let request = Request::builder()
        .uri("/reports/weekly")
        .header(header::COOKIE, "token=forged.token.value")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_str(&response, header::LOCATION), Some("/login"));
}

#[tokio::test]
async fn dashboard_accepts_cookie_or_bearer() {
    let app = TestApp::new().await;
    let token = app.token_for(&agent_claims());

    let response = app.send(get_with_cookie("/dashboard", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get_with_bearer("/dashboard", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn authenticated_login_page_redirects_to_dashboard() {
    let app = TestApp::new().await;
    let token = app.token_for(&admin_claims());

    let response = app.send(get_with_cookie("/login", &token)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_str(&response, header::LOCATION), Some("/dashboard"));
}

#[tokio::test]
async fn public_routes_are_served_without_credentials() {
    let app = TestApp::new().await;

    assert_eq!(app.send(get("/login")).await.status(), StatusCode::OK);
    assert_eq!(app.send(get("/")).await.status(), StatusCode::OK);

    let expired = app.expired_token_for(&admin_claims());
    let response = app.send(get_with_cookie("/login", &expired)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // 根路径即使已认证也不跳转
    let token = app.token_for(&admin_claims());
    assert_eq!(app.send(get_with_cookie("/", &token)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn images_are_public_and_never_redirected() {
    let app = TestApp::new().await;
    assert!(app.images_path().join("logo.png").exists());

    let response = app.send(get("/images/logo.png")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/images/logo.png")
        .header(header::COOKIE, "token=garbage")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let missing = app.send(get("/images/absent.png")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(missing.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn frontend_assets_are_served_without_credentials() {
    let public_dir = tempfile::tempdir().unwrap();
    std::fs::write(public_dir.path().join("index.html"), "<html>app</html>").unwrap();
    std::fs::write(public_dir.path().join("favicon.ico"), b"ico").unwrap();
    std::fs::create_dir(public_dir.path().join("assets")).unwrap();
    std::fs::write(public_dir.path().join("assets/app.js"), "console.log(1)").unwrap();

    let root = public_dir.path().to_path_buf();
    let app = TestApp::with_config(|config| config.static_files.public_dir = Some(root)).await;

    assert_eq!(app.send(get("/login")).await.status(), StatusCode::OK);

    let bundle = app.send(get("/assets/app.js")).await;
    assert_eq!(bundle.status(), StatusCode::OK);
    assert!(bundle.headers().get(header::LOCATION).is_none());
    let bytes = axum::body::to_bytes(bundle.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"console.log(1)");

    assert_eq!(app.send(get("/favicon.ico")).await.status(), StatusCode::OK);

    // 前端页面本身仍受保护
    let dashboard = app.send(get("/dashboard")).await;
    assert_eq!(dashboard.status(), StatusCode::FOUND);
    assert_eq!(header_str(&dashboard, header::LOCATION), Some("/login"));
}

#[tokio::test]
async fn api_without_credentials_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.send(get("/api/sites")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn expired_and_invalid_tokens_look_the_same_to_api_clients() {
    let app = TestApp::new().await;

    let expired = app.expired_token_for(&admin_claims());
    let expired_response = app.send(get_with_bearer("/api/auth/me", &expired)).await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Bearer forged.token.value")
        .body(Body::empty())
        .unwrap();
    let forged_response = app.send(request).await;

    assert_eq!(expired_response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(forged_response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(expired_response).await, body_json(forged_response).await);
}

#[tokio::test]
async fn me_returns_claims_for_bearer_clients() {
    let app = TestApp::new().await;
    let token = app.token_for(&manager_claims());

    let response = app.send(get_with_bearer("/api/auth/me", &token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "id": 2,
            "role": "regional_manager",
            "region_ids": [2, 5],
            "email": MANAGER_EMAIL
        })
    );
}

#[tokio::test]
async fn ping_needs_no_credentials() {
    let app = TestApp::new().await;

    let response = app.send(get("/api/ping")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn every_response_carries_request_id() {
    let app = TestApp::new().await;

    for uri in ["/api/ping", "/dashboard", "/images/logo.png"] {
        let response = app.send(get(uri)).await;
        let id = header_str(&response, "x-request-id".parse().unwrap()).unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok(), "{uri}: {id}");
    }
}
