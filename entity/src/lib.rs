//! # Entity 模块
//!
//! 包含访问控制核心所需的 Sea-ORM 实体定义

pub mod sites;
pub mod user_regions;
pub mod users;

pub use sites::Entity as Sites;
pub use user_regions::Entity as UserRegions;
pub use users::Entity as Users;
