//! Pre-save audit stamping.
//!
//! Repositories call [`Audited::stamp_created`] or [`Audited::stamp_modified`]
//! on an active model right before handing it to the database. The actor is
//! always passed in explicitly.

use sea_orm::Set;

use super::timestamp_now;
use crate::domain::Actor;
use crate::entities::{counties, home_content, resources, tags};

/// Who changed a row and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    pub actor: String,
    pub at: String,
}

impl AuditStamp {
    #[must_use]
    pub fn now(actor: &Actor) -> Self {
        Self {
            actor: actor.name().to_string(),
            at: timestamp_now(),
        }
    }
}

pub trait Audited {
    /// Stamps both the created and updated audit columns of a new row.
    fn stamp_created(&mut self, stamp: &AuditStamp);

    /// Stamps only the updated audit columns. Creation fields stay untouched.
    fn stamp_modified(&mut self, stamp: &AuditStamp);
}

macro_rules! impl_audited {
    ($($entity:ident),+ $(,)?) => {
        $(
            impl Audited for $entity::ActiveModel {
                fn stamp_created(&mut self, stamp: &AuditStamp) {
                    self.created_at = Set(stamp.at.clone());
                    self.created_by = Set(stamp.actor.clone());
                    self.stamp_modified(stamp);
                }

                fn stamp_modified(&mut self, stamp: &AuditStamp) {
                    self.updated_at = Set(stamp.at.clone());
                    self.updated_by = Set(stamp.actor.clone());
                }
            }
        )+
    };
}

impl_audited!(home_content, counties, resources, tags);
