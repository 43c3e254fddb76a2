//! Data models for the settings store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ticketdesk_core::{CategoryId, ChannelId, RoleId, TenantId};

/// The durable ticket-system settings of one tenant.
///
/// Every field except `tenant_id` may be unset: a row is created by the first
/// wizard step and filled in step by step, so an abandoned setup leaves a
/// partially populated record behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Owning tenant (primary key, never changes)
    pub tenant_id: TenantId,

    /// Category new tickets are created under
    pub category: Option<CategoryId>,

    /// Roles allowed to handle tickets (empty = not selected)
    pub support_roles: BTreeSet<RoleId>,

    /// Channel that receives ticket activity logs
    pub log_channel: Option<ChannelId>,

    /// Channel the "create ticket" entry point is posted to
    pub publish_channel: Option<ChannelId>,

    /// When the entry point was last published from these settings
    pub published_at: Option<DateTime<Utc>>,
}

impl TenantSettings {
    /// An empty record for a tenant.
    pub fn empty(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            category: None,
            support_roles: BTreeSet::new(),
            log_channel: None,
            publish_channel: None,
            published_at: None,
        }
    }

    /// Apply a patch in place, leaving omitted fields untouched.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(roles) = &patch.support_roles {
            self.support_roles = roles.clone();
        }
        if let Some(channel) = patch.log_channel {
            self.log_channel = Some(channel);
        }
        if let Some(channel) = patch.publish_channel {
            self.publish_channel = Some(channel);
        }
    }

    /// Returns true once every wizard field has been selected.
    pub fn is_complete(&self) -> bool {
        self.category.is_some()
            && !self.support_roles.is_empty()
            && self.log_channel.is_some()
            && self.publish_channel.is_some()
    }
}

/// A partial update of [`TenantSettings`].
///
/// `None` means "leave unchanged"; there is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub category: Option<CategoryId>,
    pub support_roles: Option<BTreeSet<RoleId>>,
    pub log_channel: Option<ChannelId>,
    pub publish_channel: Option<ChannelId>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket category.
    pub fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the support roles.
    pub fn support_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.support_roles = Some(roles.into_iter().collect());
        self
    }

    /// Set the log channel.
    pub fn log_channel(mut self, channel: ChannelId) -> Self {
        self.log_channel = Some(channel);
        self
    }

    /// Set the entry point channel.
    pub fn publish_channel(mut self, channel: ChannelId) -> Self {
        self.publish_channel = Some(channel);
        self
    }

    /// Returns true if the patch would not change any field.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.support_roles.is_none()
            && self.log_channel.is_none()
            && self.publish_channel.is_none()
    }

    /// Names of the fields this patch writes, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.category.is_some() {
            fields.push("category");
        }
        if self.support_roles.is_some() {
            fields.push("support_roles");
        }
        if self.log_channel.is_some() {
            fields.push("log_channel");
        }
        if self.publish_channel.is_some() {
            fields.push("publish_channel");
        }
        fields
    }
}
