//! # 数据可见范围
//!
//! 角色到过滤器的映射只在 [`AuthorizationScope::build`] 中定义一次，
//! 所有列表、计数和详情接口都必须经由它取得过滤条件。

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition};
use std::collections::BTreeSet;

use crate::auth::types::{Claims, Role};

/// 作用于记录 (creator_id, region_id) 的可见性谓词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// 可见全部记录
    Unrestricted,
    /// 区域属于集合内的记录
    RegionScoped(BTreeSet<i32>),
    /// 创建者为该主体的记录
    OwnerScoped(i32),
}

impl ScopeFilter {
    /// 内存中判定单条记录；没有区域的记录对区域范围不可见
    #[must_use]
    pub fn admits(&self, creator_id: i32, region_id: Option<i32>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::RegionScoped(region_ids) => {
                region_id.is_some_and(|region| region_ids.contains(&region))
            }
            Self::OwnerScoped(subject_id) => creator_id == *subject_id,
        }
    }

    /// 转换为 sea-orm 查询条件
    #[must_use]
    pub fn condition<C: ColumnTrait>(&self, creator_column: C, region_column: C) -> Condition {
        match self {
            Self::Unrestricted => Condition::all(),
            // 空区域集合：恒假
            Self::RegionScoped(region_ids) if region_ids.is_empty() => {
                Condition::all().add(Expr::val(1).eq(0))
            }
            Self::RegionScoped(region_ids) => {
                Condition::all().add(region_column.is_in(region_ids.iter().copied()))
            }
            Self::OwnerScoped(subject_id) => Condition::all().add(creator_column.eq(*subject_id)),
        }
    }

    /// 日志用的范围名称
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::RegionScoped(_) => "region_scoped",
            Self::OwnerScoped(_) => "owner_scoped",
        }
    }
}

/// 授权范围构建器
pub struct AuthorizationScope;

impl AuthorizationScope {
    /// 由声明确定性地构建过滤器
    #[must_use]
    pub fn build(claims: &Claims) -> ScopeFilter {
        match claims.role() {
            Role::Admin => ScopeFilter::Unrestricted,
            Role::RegionalManager => ScopeFilter::RegionScoped(claims.region_ids().clone()),
            Role::FieldAgent => ScopeFilter::OwnerScoped(claims.subject_id()),
        }
    }
}
