//! # 用户实体定义
//!
//! 账户表的 Sea-ORM 实体模型。认证核心只读取其中的 id、email、角色、
//! 状态和密码哈希，`last_seen` 由登录流程尽力更新。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用户实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 角色标签：`admin` / `regional_manager` / `field_agent`
    pub role: String,
    /// 账户状态：`active|actif`、`inactive|inactif`、`suspended|suspendu`
    pub status: String,
    pub last_seen: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_regions::Entity")]
    UserRegions,
    #[sea_orm(has_many = "super::sites::Entity")]
    Sites,
}

impl Related<super::user_regions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRegions.def()
    }
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
