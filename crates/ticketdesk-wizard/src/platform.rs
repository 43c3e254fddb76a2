//! Seams to the chat platform.
//!
//! The wizard never talks to the platform gateway directly. It asks an
//! [`EntityDirectory`] for the options of a step and hands the finished entry
//! point to an [`EntryPointPublisher`].
//!
//! ## Implementations
//!
//! - [`StaticDirectory`] - Fixed option lists, loadable from YAML
//! - [`RecordingPublisher`] - Records publish requests; can be told to fail

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ticketdesk_core::{
    CategoryId, ChannelId, EntityKind, EntityOption, EntityRef, RoleId, TenantId,
};
use tokio::sync::Mutex;
use tracing::info;

/// Failures reported by the platform collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("channel {0} not found")]
    ChannelNotFound(ChannelId),

    #[error("missing permission {permission} in channel {channel}")]
    MissingPermission {
        channel: ChannelId,
        permission: String,
    },

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            PlatformError::ChannelNotFound(_) => "the channel no longer exists".to_string(),
            PlatformError::MissingPermission { permission, .. } => {
                format!("the bot lacks the {} permission there", permission)
            }
            PlatformError::Unavailable(_) => "the chat platform is not responding".to_string(),
        }
    }
}

/// Supplies the selectable entities of a tenant.
///
/// Results are already scoped to the tenant and filtered to what makes sense
/// for the kind (e.g. no `@everyone` role).
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    async fn options(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
    ) -> Result<Vec<EntityOption>, PlatformError>;
}

/// Static content of the "create ticket" entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointPayload {
    pub title: String,
    pub description: String,
    pub button_label: String,
}

/// A request to post the entry point into a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub tenant_id: TenantId,
    pub channel: ChannelId,
    pub payload: EntryPointPayload,
}

/// Posts the entry point to the platform.
#[async_trait]
pub trait EntryPointPublisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<(), PlatformError>;
}

/// An option entry in a directory file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LabeledId {
    id: u64,
    name: String,
}

/// Directory file layout: one list per entity kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct DirectoryFile {
    categories: Vec<LabeledId>,
    roles: Vec<LabeledId>,
    text_channels: Vec<LabeledId>,
}

/// A directory with fixed option lists, shared by all tenants.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    options: HashMap<EntityKind, Vec<EntityOption>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category option.
    pub fn with_category(mut self, id: CategoryId, name: impl Into<String>) -> Self {
        self.push(EntityRef::category(id), name);
        self
    }

    /// Add a role option.
    pub fn with_role(mut self, id: RoleId, name: impl Into<String>) -> Self {
        self.push(EntityRef::role(id), name);
        self
    }

    /// Add a text channel option.
    pub fn with_text_channel(mut self, id: ChannelId, name: impl Into<String>) -> Self {
        self.push(EntityRef::text_channel(id), name);
        self
    }

    fn push(&mut self, entity: EntityRef, name: impl Into<String>) {
        self.options
            .entry(entity.kind)
            .or_default()
            .push(EntityOption::new(entity, name));
    }

    /// Parse a directory from YAML (`categories`, `roles`, `text_channels`).
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let file: DirectoryFile = serde_yaml::from_str(content)?;
        let mut directory = Self::new();
        for entry in file.categories {
            directory = directory.with_category(CategoryId(entry.id), entry.name);
        }
        for entry in file.roles {
            directory = directory.with_role(RoleId(entry.id), entry.name);
        }
        for entry in file.text_channels {
            directory = directory.with_text_channel(ChannelId(entry.id), entry.name);
        }
        Ok(directory)
    }
}

#[async_trait]
impl EntityDirectory for StaticDirectory {
    async fn options(
        &self,
        _tenant_id: TenantId,
        kind: EntityKind,
    ) -> Result<Vec<EntityOption>, PlatformError> {
        Ok(self.options.get(&kind).cloned().unwrap_or_default())
    }
}

/// Publisher that records requests instead of posting them.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<PublishRequest>>,
    failure: Mutex<Option<PlatformError>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent publish with `error`.
    pub async fn fail_with(&self, error: PlatformError) {
        *self.failure.lock().await = Some(error);
    }

    /// Let subsequent publishes succeed again.
    pub async fn succeed(&self) {
        *self.failure.lock().await = None;
    }

    /// Requests that were published successfully.
    pub async fn published(&self) -> Vec<PublishRequest> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl EntryPointPublisher for RecordingPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<(), PlatformError> {
        if let Some(error) = self.failure.lock().await.clone() {
            return Err(error);
        }
        info!(
            tenant_id = %request.tenant_id,
            channel = %request.channel,
            title = %request.payload.title,
            "Entry point published"
        );
        self.published.lock().await.push(request.clone());
        Ok(())
    }
}
