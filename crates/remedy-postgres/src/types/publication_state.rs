//! Publication state enumeration.

use diesel_derive_enum::DbEnum;
use remedy_core::types;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Defines the publication state of a document version.
///
/// This enumeration corresponds to the `PUBLICATION_STATE` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::PublicationState"]
pub enum PublicationState {
    /// Version is still being edited
    #[db_rename = "draft"]
    #[serde(rename = "draft")]
    #[default]
    Draft,

    /// Version is publicly visible
    #[db_rename = "published"]
    #[serde(rename = "published")]
    Published,

    /// Version was removed from public view
    #[db_rename = "withdrawn"]
    #[serde(rename = "withdrawn")]
    Withdrawn,
}

impl From<PublicationState> for types::PublicationState {
    fn from(value: PublicationState) -> Self {
        match value {
            PublicationState::Draft => Self::Draft,
            PublicationState::Published => Self::Published,
            PublicationState::Withdrawn => Self::Withdrawn,
        }
    }
}

impl From<types::PublicationState> for PublicationState {
    fn from(value: types::PublicationState) -> Self {
        match value {
            types::PublicationState::Draft => Self::Draft,
            types::PublicationState::Published => Self::Published,
            types::PublicationState::Withdrawn => Self::Withdrawn,
        }
    }
}
