//! The unified error handling system for the application.

use std::fmt::Display;

pub use auth::{AuthError, InactiveReason};
pub use types::PortalError;

/// A unified `Result` type for the entire application.
pub type Result<T> = std::result::Result<T, PortalError>;

pub mod auth;
pub mod macros;
pub mod types;

/// Context Trait for adding context to errors.
pub trait Context<T, E> {
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display;

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<PortalError>,
{
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.with_context(|| context)
    }

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|error| {
            let error = error.into();
            let message = context().to_string();
            match error {
                // 认证错误保持原样，调用方依赖其具体变体
                PortalError::Auth(_) => error,
                PortalError::Config { .. } => PortalError::config_with_source(message, error),
                PortalError::Database { .. } => {
                    PortalError::database_with_source(message, error)
                }
                other => PortalError::internal_with_source(message, other),
            }
        })
    }
}
