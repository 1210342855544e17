//! # 认证授权模块
//!
//! 会话令牌、凭证提取、来源策略、数据可见范围和登录流程

pub mod credentials;
pub mod jwt;
pub mod origin;
pub mod password;
pub mod scope;
pub mod session;
pub mod store;
pub mod types;

pub use credentials::{CredentialExtractor, CredentialSource, RawCredential, SESSION_COOKIE_NAME};
pub use jwt::{SESSION_TTL_SECONDS, SessionToken, TokenService};
pub use origin::{OriginDecision, OriginPolicy};
pub use password::{BcryptVerifier, PasswordVerifier, hash_password};
pub use scope::{AuthorizationScope, ScopeFilter};
pub use session::{LoginOutcome, SessionIssuer};
pub use store::{AccountStore, SeaOrmAccountStore};
pub use types::{AccountRecord, AccountStatus, Claims, Role};
