//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`request_context::RequestMeta`] -- Captures client metadata for audit entries.

pub mod auth;
pub mod request_context;
