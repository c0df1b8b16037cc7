//! Row types mirroring the tables, one module per aggregate.

pub mod audit;
pub mod project;
pub mod task;
pub mod user;

/// Build a decode error for a value the schema should never hold.
pub(crate) fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}
