//! Collaborator services composed by the route handlers.

pub mod crypto;
pub mod git;
pub mod statistics;
pub mod sync;

/// Datastore failures surface as internal errors carrying the underlying message.
pub(crate) fn db_err(err: trackboard_db::DbError) -> trackboard_core::Error {
    trackboard_core::Error::Internal(err.to_string())
}
