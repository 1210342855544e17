//! # 认证类型定义
//!
//! 会话声明、角色与账户状态。声明在每次请求时从已验证的令牌中重新解出，
//! 从不持久化。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::InactiveReason;

/// 封闭的角色集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 顶级管理员，可见全部记录
    Admin,
    /// 区域经理，可见所属区域内的记录
    RegionalManager,
    /// 外勤人员，只可见自己创建的记录
    FieldAgent,
}

impl Role {
    /// 存储与编码使用的标签
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::RegionalManager => "regional_manager",
            Self::FieldAgent => "field_agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Self::Admin),
            "regional_manager" => Ok(Self::RegionalManager),
            "field_agent" => Ok(Self::FieldAgent),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// 无法识别的角色标签
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role tag: {0}")]
pub struct UnknownRole(pub String);

/// 账户状态
///
/// 存储中的状态串接受英文或法文写法，其余一律视为 `Unknown`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
    Unknown(String),
}

impl AccountStatus {
    /// 解析存储中的状态标签
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "active" | "actif" => Self::Active,
            "inactive" | "inactif" => Self::Inactive,
            "suspended" | "suspendu" => Self::Suspended,
            _ => Self::Unknown(tag.to_string()),
        }
    }

    /// 不允许登录时给出原因
    #[must_use]
    pub const fn inactive_reason(&self) -> Option<InactiveReason> {
        match self {
            Self::Active => None,
            Self::Inactive => Some(InactiveReason::Inactive),
            Self::Suspended => Some(InactiveReason::Suspended),
            Self::Unknown(_) => Some(InactiveReason::Unknown),
        }
    }
}

/// 账户记录（由外部用户存储提供，认证核心只读）
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// 账户 ID
    pub id: i32,
    /// 登录邮箱
    pub email: String,
    /// 角色
    pub role: Role,
    /// 账户状态
    pub status: AccountStatus,
    /// 区域经理所属区域
    pub region_ids: BTreeSet<i32>,
    /// bcrypt 哈希
    pub password_hash: String,
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("region_ids", &self.region_ids)
            .finish_non_exhaustive()
    }
}

/// 已验证会话的声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    #[serde(rename = "id")]
    subject_id: i32,
    role: Role,
    region_ids: BTreeSet<i32>,
    email: String,
}

impl Claims {
    /// 创建声明
    pub fn new(
        subject_id: i32,
        role: Role,
        region_ids: impl IntoIterator<Item = i32>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            subject_id,
            role,
            region_ids: region_ids.into_iter().collect(),
            email: email.into(),
        }
    }

    /// 为账户生成声明
    #[must_use]
    pub fn for_account(account: &AccountRecord) -> Self {
        Self {
            subject_id: account.id,
            role: account.role,
            region_ids: account.region_ids.clone(),
            email: account.email.clone(),
        }
    }

    /// 账户 ID
    #[must_use]
    pub const fn subject_id(&self) -> i32 {
        self.subject_id
    }

    /// 角色
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// 所属区域，仅区域经理非空
    #[must_use]
    pub const fn region_ids(&self) -> &BTreeSet<i32> {
        &self.region_ids
    }

    /// 仅用于展示
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
