//! Typed identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for rows owned by this service: projects, members, iterations
/// and repositories. Work items are excluded; they keep the integer ids
/// assigned by the external tracking system.
///
/// UUIDv7, so freshly created rows sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an id that arrived on the HTTP boundary or was read from a row.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}
