//! Shared type definitions used across ticketdesk crates.
//!
//! Every entity the chat platform hands us is addressed by a 64-bit snowflake.
//! The newtypes below keep a role id from being passed where a channel id is
//! expected; [`EntityRef`] carries the kind alongside the id for the places
//! where the platform delivers untyped selections.

use serde::{Deserialize, Serialize};

use crate::error::TicketdeskError;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = TicketdeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| TicketdeskError::InvalidId {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }
    };
}

snowflake_id!(
    /// A tenant (guild) that owns one settings record.
    TenantId
);
snowflake_id!(
    /// The administrator driving a configuration flow.
    AdminId
);
snowflake_id!(
    /// A channel category that groups created tickets.
    CategoryId
);
snowflake_id!(
    /// A role authorized to handle tickets.
    RoleId
);
snowflake_id!(
    /// A text channel.
    ChannelId
);

/// The kind of platform entity a selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Channel category
    Category,
    /// Guild role
    Role,
    /// Text channel
    TextChannel,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Role => write!(f, "role"),
            Self::TextChannel => write!(f, "text channel"),
        }
    }
}

/// A typed reference to a platform entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u64,
}

impl EntityRef {
    pub fn category(id: CategoryId) -> Self {
        Self {
            kind: EntityKind::Category,
            id: id.get(),
        }
    }

    pub fn role(id: RoleId) -> Self {
        Self {
            kind: EntityKind::Role,
            id: id.get(),
        }
    }

    pub fn text_channel(id: ChannelId) -> Self {
        Self {
            kind: EntityKind::TextChannel,
            id: id.get(),
        }
    }

    /// Render the entity the way the platform renders mentions.
    ///
    /// Categories and channels use `<#id>`, roles use `<@&id>`.
    pub fn mention(&self) -> String {
        match self.kind {
            EntityKind::Role => format!("<@&{}>", self.id),
            EntityKind::Category | EntityKind::TextChannel => format!("<#{}>", self.id),
        }
    }
}

/// A selectable option offered to the administrator for one wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOption {
    pub entity: EntityRef,
    /// Human-readable label (entity name as shown by the platform)
    pub label: String,
}

impl EntityOption {
    pub fn new(entity: EntityRef, label: impl Into<String>) -> Self {
        Self {
            entity,
            label: label.into(),
        }
    }
}
