//! Domain core for the project-management backend.
//!
//! Holds the entities, status enums, error taxonomy, the validation gate,
//! audit recording, and the lifecycle managers for projects and tasks.
//! Persistence is reached only through the ports in [`store`], so this crate
//! performs no I/O of its own.

pub mod audit;
pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod project;
pub mod status;
pub mod store;
pub mod task;
pub mod types;
pub mod user;
pub mod users;
pub mod validation;
