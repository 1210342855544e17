//! # 站点处理器
//!
//! 受范围约束的示例资源。每个查询都通过 `AuthorizationScope` 取得条件，
//! 范围外的记录与不存在的记录表现一致。

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use sea_orm::{Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use entity::{Sites, sites};

use crate::auth::{AuthorizationScope, Claims};
use crate::error::{AuthError, Context, PortalError};
use crate::web::extract::Authenticated;
use crate::web::response::ApiResponse;
use crate::web::server::AppState;

/// 计数响应
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// 可见站点数
    pub count: u64,
}

fn scope_condition(claims: &Claims) -> Condition {
    AuthorizationScope::build(claims).condition(sites::Column::CreatedBy, sites::Column::RegionId)
}

/// `GET /api/sites`
pub async fn list_sites(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<ApiResponse<Vec<sites::Model>>, PortalError> {
    let rows = Sites::find()
        .filter(scope_condition(&claims))
        .order_by_asc(sites::Column::Id)
        .all(state.database())
        .await
        .context("查询站点失败")?;

    Ok(ApiResponse::Success(rows))
}

/// `GET /api/sites/count`
pub async fn count_sites(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<ApiResponse<CountResponse>, PortalError> {
    let count = Sites::find()
        .filter(scope_condition(&claims))
        .count(state.database())
        .await
        .context("统计站点失败")?;

    Ok(ApiResponse::Success(CountResponse { count }))
}

/// `GET /api/sites/{id}`
pub async fn get_site(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(id): Path<i32>,
) -> Response {
    let result = Sites::find_by_id(id)
        .filter(scope_condition(&claims))
        .one(state.database())
        .await;

    match result {
        Ok(Some(site)) => ApiResponse::Success(site).into_response(),
        Ok(None) => AuthError::InsufficientScope.into_response(),
        Err(e) => PortalError::database_with_source("查询站点失败", e).into_response(),
    }
}
