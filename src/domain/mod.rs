//! Domain primitives shared by the storage, service and HTTP layers.
//!
//! Everything here is plain data: the identity performing a change, the
//! capability set of a signed-in user, the resource kinds and the
//! display-order assignment used by the reorder endpoints.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is performing a write. Used to stamp `created_by`/`updated_by`.
///
/// The HTTP layer derives it from the admin session; seeding and the CLI
/// use [`Actor::system`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor(String);

impl Actor {
    pub const SYSTEM: &'static str = "System";

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capabilities carried by an authenticated identity.
///
/// Every admin user holds [`Capability::Admin`]; there is no other role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Admin,
}

/// Kind of a county resource. Stored as its integer discriminant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[sea_orm(num_value = 1)]
    Video,
    #[sea_orm(num_value = 2)]
    Link,
    #[sea_orm(num_value = 3)]
    Document,
    #[sea_orm(num_value = 4)]
    Article,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Video => "video",
            Self::Link => "link",
            Self::Document => "document",
            Self::Article => "article",
        };
        f.write_str(label)
    }
}

/// Assigns dense 1-based display positions in the order the caller listed
/// the ids. Duplicate ids keep their first position.
#[must_use]
pub fn display_positions(ids: &[i32]) -> Vec<(i32, i32)> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    let mut positions = Vec::with_capacity(ids.len());
    let mut next = 1;

    for &id in ids {
        if seen.insert(id) {
            positions.push((id, next));
            next += 1;
        }
    }

    positions
}
