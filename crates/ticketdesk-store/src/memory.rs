//! In-process settings store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ticketdesk_core::TenantId;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::models::{SettingsPatch, TenantSettings};
use crate::store::SettingsStore;

/// A [`SettingsStore`] that keeps records in memory.
///
/// Nothing survives the process. Writes can be switched off with
/// [`set_unavailable`](Self::set_unavailable) to exercise persistence failures.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    records: RwLock<HashMap<TenantId, TenantSettings>>,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful writes (upserts and publish marks).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn upsert(&self, tenant_id: TenantId, patch: &SettingsPatch) -> Result<()> {
        self.check_available()?;
        let mut records = self.records.write().await;
        records
            .entry(tenant_id)
            .or_insert_with(|| TenantSettings::empty(tenant_id))
            .apply(patch);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, tenant_id: TenantId) -> Result<Option<TenantSettings>> {
        self.check_available()?;
        Ok(self.records.read().await.get(&tenant_id).cloned())
    }

    async fn mark_published(&self, tenant_id: TenantId, at: DateTime<Utc>) -> Result<()> {
        self.check_available()?;
        let mut records = self.records.write().await;
        records
            .entry(tenant_id)
            .or_insert_with(|| TenantSettings::empty(tenant_id))
            .published_at = Some(at);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
