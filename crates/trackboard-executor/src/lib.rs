//! Build execution backend for Trackboard.
//!
//! Provides the local shell runner used to rebuild a repository's checkout
//! when the sync workflow observes a new revision.

pub mod shell;

pub use shell::LocalShellExecutor;
pub use trackboard_core::runner::{BuildOutput, BuildRunner};
