//! The settings store contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ticketdesk_core::TenantId;

use crate::error::Result;
use crate::models::{SettingsPatch, TenantSettings};

/// Durable per-tenant settings storage.
///
/// Implementations must apply each call atomically: a concurrent reader sees
/// either the whole patch or none of it. Calls for different tenants never
/// need to coordinate.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Write the fields present in `patch`, creating the row if needed.
    async fn upsert(&self, tenant_id: TenantId, patch: &SettingsPatch) -> Result<()>;

    /// Read the full record, or `None` if the tenant has never been configured.
    async fn read(&self, tenant_id: TenantId) -> Result<Option<TenantSettings>>;

    /// Record that the entry point was published from the current settings.
    async fn mark_published(&self, tenant_id: TenantId, at: DateTime<Utc>) -> Result<()>;
}

#[async_trait]
impl<S: SettingsStore + ?Sized> SettingsStore for Arc<S> {
    async fn upsert(&self, tenant_id: TenantId, patch: &SettingsPatch) -> Result<()> {
        (**self).upsert(tenant_id, patch).await
    }

    async fn read(&self, tenant_id: TenantId) -> Result<Option<TenantSettings>> {
        (**self).read(tenant_id).await
    }

    async fn mark_published(&self, tenant_id: TenantId, at: DateTime<Utc>) -> Result<()> {
        (**self).mark_published(tenant_id, at).await
    }
}
