//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async SQL methods that
//! accept `&mut PgConnection` as the first argument, so the same method
//! serves a pooled connection or an open transaction.

pub mod audit_repo;
pub mod project_repo;
pub mod task_repo;
pub mod user_repo;

pub use audit_repo::AuditLogRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
