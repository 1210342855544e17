//! # 请求闸门
//!
//! 每个请求都经过这里：路径分类 -> CORS 阶段（仅 API/字体）-> 认证阶段。
//! CORS 判定从不报错，最坏结果是不输出允许头、由浏览器拦截。
//! 页面路由认证失败重定向到登录页；API 路由只附加声明，是否 401 由接口决定。

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::request_id::RequestId;
use crate::auth::{Claims, CredentialExtractor, OriginDecision};
use crate::error::AuthError;
use crate::logging::{LogComponent, LogStage, sanitize_token};
use crate::web::server::AppState;
use crate::{ldebug, linfo};

/// 登录页路径
pub const LOGIN_PATH: &str = "/login";
/// 登录后的默认页面
pub const DASHBOARD_PATH: &str = "/dashboard";

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, Cookie";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// 前端构建产物的公开前缀
const PUBLIC_ASSET_PREFIXES: &[&str] = &["/assets/"];
/// 前端根目录下的公开文件
const PUBLIC_ASSET_FILES: &[&str] = &["/favicon.ico", "/robots.txt", "/manifest.json"];

/// 路径类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// `/api`、`/api/...`、`/fonts/...`
    ApiOrFontAsset,
    /// `/images/...`，始终公开
    PublicImageAsset,
    /// `/assets/...` 与前端根目录公开文件，登录页渲染所需
    PublicStaticAsset,
    /// `/` 与 `/login`
    PublicRoute,
    /// 其余全部
    ProtectedRoute,
}

impl PathClass {
    /// 对请求路径分类
    #[must_use]
    pub fn classify(path: &str) -> Self {
        if path == "/api" || path.starts_with("/api/") || path.starts_with("/fonts/") {
            Self::ApiOrFontAsset
        } else if path.starts_with("/images/") {
            Self::PublicImageAsset
        } else if PUBLIC_ASSET_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
            || PUBLIC_ASSET_FILES.contains(&path)
        {
            Self::PublicStaticAsset
        } else if path == "/" || path == LOGIN_PATH {
            Self::PublicRoute
        } else {
            Self::ProtectedRoute
        }
    }
}

/// 请求闸门中间件
pub async fn request_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    let path = request.uri().path().to_string();
    let class = PathClass::classify(&path);

    match class {
        PathClass::ApiOrFontAsset => {
            let decision = state.origins().evaluate(request.headers());
            if let OriginDecision::Rejected = decision
                && request.headers().contains_key(header::ORIGIN)
            {
                ldebug!(
                    &request_id,
                    LogStage::Cors,
                    LogComponent::Gate,
                    "origin_rejected",
                    &format!("来源未被允许，不输出 CORS 允许头: {path}")
                );
            }

            if request.method() == Method::OPTIONS {
                return preflight_response(&decision);
            }

            // API 路由只尝试认证，不在这里拒绝
            if let Ok(claims) = authenticate(&state, request.headers(), &request_id) {
                request.extensions_mut().insert(claims);
            }

            let mut response = next.run(request).await;
            apply_cors_headers(response.headers_mut(), &decision, false);
            response
        }
        PathClass::PublicImageAsset | PathClass::PublicStaticAsset => next.run(request).await,
        PathClass::PublicRoute => {
            if path == LOGIN_PATH && authenticate(&state, request.headers(), &request_id).is_ok() {
                return redirect(DASHBOARD_PATH);
            }
            next.run(request).await
        }
        PathClass::ProtectedRoute => {
            match authenticate(&state, request.headers(), &request_id) {
                Ok(claims) => {
                    request.extensions_mut().insert(claims);
                    next.run(request).await
                }
                Err(e) => {
                    linfo!(
                        &request_id,
                        LogStage::Authentication,
                        LogComponent::Gate,
                        "redirect_login",
                        &format!("{path} 未通过认证（{e}），重定向到登录页")
                    );
                    redirect(LOGIN_PATH)
                }
            }
        }
    }
}

/// 提取并验证凭证
fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &str,
) -> Result<Claims, AuthError> {
    let credential = CredentialExtractor::extract(headers).ok_or(AuthError::MissingCredentials)?;

    state.tokens().verify(credential.token()).inspect_err(|e| {
        ldebug!(
            request_id,
            LogStage::Authentication,
            LogComponent::Token,
            "verify_failed",
            &format!(
                "{} 凭证 {} 验证失败: {e}",
                credential.source().as_str(),
                sanitize_token(credential.token())
            )
        );
    })
}

/// 预检响应：始终 200 并携带 `Vary: Origin`
fn preflight_response(decision: &OriginDecision) -> Response {
    let mut response = StatusCode::OK.into_response();
    apply_cors_headers(response.headers_mut(), decision, true);
    response
}

/// 写入 CORS 头；来源未被允许时只写 `Vary`
fn apply_cors_headers(headers: &mut HeaderMap, decision: &OriginDecision, preflight: bool) {
    headers.append(header::VARY, HeaderValue::from_static("Origin"));

    let Some(origin) = decision
        .allowed_origin()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    else {
        return;
    };

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    if preflight {
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
    }
}

/// 302 跳转
fn redirect(location: &'static str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, HeaderValue::from_static(location))],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api", PathClass::ApiOrFontAsset)]
    #[case("/api/sites", PathClass::ApiOrFontAsset)]
    #[case("/fonts/inter.woff2", PathClass::ApiOrFontAsset)]
    #[case("/images/logo.png", PathClass::PublicImageAsset)]
    #[case("/assets/index-3f2a.js", PathClass::PublicStaticAsset)]
    #[case("/favicon.ico", PathClass::PublicStaticAsset)]
    #[case("/manifest.json", PathClass::PublicStaticAsset)]
    #[case("/assets", PathClass::ProtectedRoute)]
    #[case("/", PathClass::PublicRoute)]
    #[case("/login", PathClass::PublicRoute)]
    #[case("/dashboard", PathClass::ProtectedRoute)]
    #[case("/apis", PathClass::ProtectedRoute)]
    #[case("/images", PathClass::ProtectedRoute)]
    #[case("/login/extra", PathClass::ProtectedRoute)]
    fn test_classify(#[case] path: &str, #[case] expected: PathClass) {
        assert_eq!(PathClass::classify(path), expected);
    }

    #[test]
    fn test_rejected_origin_only_gets_vary() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, &OriginDecision::Rejected, true);

        assert_eq!(headers.get(header::VARY).unwrap(), "Origin");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
        assert!(headers.get(header::ACCESS_CONTROL_MAX_AGE).is_none());
    }

    #[test]
    fn test_allowed_origin_headers() {
        let decision = OriginDecision::Allowed("http://localhost:5173".to_string());

        let mut preflight = HeaderMap::new();
        apply_cors_headers(&mut preflight, &decision, true);
        assert_eq!(
            preflight.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(preflight.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");

        let mut actual = HeaderMap::new();
        apply_cors_headers(&mut actual, &decision, false);
        assert_eq!(
            actual.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            ALLOW_METHODS
        );
        assert!(actual.get(header::ACCESS_CONTROL_MAX_AGE).is_none());
    }

    #[test]
    fn test_redirect_is_302() {
        let response = redirect(LOGIN_PATH);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }
}
