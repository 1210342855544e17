//! Errors produced by the access-control core.
//!
//! The variants form a closed taxonomy. How each one reaches a client is
//! decided in `web::response`; `OriginRejected` and `InsufficientScope` are
//! never rendered as an error body at all.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an account that passed the password check may still not sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InactiveReason {
    Inactive,
    Suspended,
    Unknown,
}

impl InactiveReason {
    /// Stable tag, also used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
            Self::Unknown => "unknown",
        }
    }

    /// 面向终端用户的本地化提示（法语）
    #[must_use]
    pub const fn localized_message(&self) -> &'static str {
        match self {
            Self::Inactive => {
                "Votre compte est inactif. Veuillez contacter un administrateur."
            }
            Self::Suspended => {
                "Votre compte a été suspendu. Veuillez contacter un administrateur."
            }
            Self::Unknown => {
                "Le statut de votre compte ne permet pas la connexion. Veuillez contacter un administrateur."
            }
        }
    }
}

impl std::fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure modes of authentication and authorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no session credential was presented")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("account is not active ({0})")]
    AccountInactive(InactiveReason),

    #[error("session token has expired")]
    TokenExpired,

    #[error("session token is invalid")]
    TokenInvalid,

    #[error("origin is not allowed")]
    OriginRejected,

    #[error("record is outside the caller's scope")]
    InsufficientScope,
}

impl AuthError {
    /// HTTP status used when the error is surfaced by an API endpoint.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::AccountInactive(_) | Self::OriginRejected => StatusCode::FORBIDDEN,
            Self::InsufficientScope => StatusCode::NOT_FOUND,
        }
    }
}
