//! # 页面处理器
//!
//! 未配置前端目录时提供最小占位页面

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::web::extract::Authenticated;
use crate::web::response::ApiResponse;

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Cluster</title></head>\
         <body><h1>Cluster</h1><a href=\"/login\">Connexion</a></body></html>",
    )
}

/// `GET /login`
pub async fn login_page() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Connexion</title></head>\
         <body><form method=\"post\" action=\"/api/auth/login\">\
         <input name=\"email\" type=\"email\"><input name=\"password\" type=\"password\">\
         <button type=\"submit\">Se connecter</button></form></body></html>",
    )
}

/// `GET /dashboard`，闸门已保证调用方已认证
pub async fn dashboard(Authenticated(claims): Authenticated) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>Tableau de bord</title></head>\
         <body><h1>Tableau de bord</h1><p>{}</p></body></html>",
        claims.role()
    ))
}

/// 未匹配的路径
pub async fn not_found() -> Response {
    ApiResponse::<()>::Error(StatusCode::NOT_FOUND, "Not found".to_string()).into_response()
}
