//! Lifecycle managers for projects and tasks.
//!
//! Every mutating operation follows the same shape inside one store
//! transaction: validate, mutate, diff, persist, audit, commit. A failure at
//! any step drops the transaction, so neither the change nor its audit entry
//! survives.

pub mod project;
pub mod task;

pub use project::ProjectLifecycle;
pub use task::TaskLifecycle;

use serde::Serialize;

use crate::error::CoreError;
use crate::store::StoreTx;
use crate::types::DbId;
use crate::user::User;

/// Outcome of one overdue sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Rows inspected.
    pub scanned: usize,
    /// Rows flipped to `LATE` by this run.
    pub marked_late: usize,
    /// Rows whose update failed; the sweep carried on past them.
    pub failed: usize,
}

/// Resolve the acting user inside the transaction.
///
/// A caller id that no longer maps to a user is an authorization failure.
pub(crate) async fn load_actor<T: StoreTx + ?Sized>(
    tx: &mut T,
    actor_id: DbId,
) -> Result<User, CoreError> {
    tx.find_user(actor_id)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Authenticated user no longer exists".into()))
}

pub(crate) async fn load_user<T: StoreTx + ?Sized>(
    tx: &mut T,
    user_id: DbId,
) -> Result<User, CoreError> {
    tx.find_user(user_id).await?.ok_or(CoreError::NotFound {
        entity: "User",
        id: user_id,
    })
}
