//! API server for the Trackboard dashboard backend.
//!
//! Exposes the REST surface over projects, work-item statistics and the
//! repository sync-then-build workflow.

pub mod error;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub mod test_support;

pub use state::AppState;
