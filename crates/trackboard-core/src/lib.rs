//! Core domain types and traits for the Trackboard dashboard backend.
//!
//! This crate contains:
//! - Resource identifiers and common types
//! - Closed status enumerations for projects, iterations and work items
//! - BuildRunner trait (shell build invocation)
//! - SyncClient trait (remote repository pull)
//! - CredentialCodec trait (repository credentials at rest)

pub mod credentials;
pub mod error;
pub mod id;
pub mod runner;
pub mod status;
pub mod sync;

pub use error::{Error, Result};
pub use id::ResourceId;
