//! Per-tenant wizard sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ticketdesk_core::{AdminId, EntityOption, TenantId};
use ticketdesk_store::TenantSettings;
use tokio::sync::Mutex;

use crate::step::WizardStep;

/// An in-progress configuration flow of one tenant.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub tenant_id: TenantId,
    /// Administrator who last drove the session
    pub admin_id: AdminId,
    pub current_step: WizardStep,
    /// Fields collected so far, seeded from the stored record
    pub draft: TenantSettings,
    /// Options shown by the last rendered prompt
    pub offered: Vec<EntityOption>,
    pub started_at: DateTime<Utc>,
    last_activity: Instant,
}

impl WizardSession {
    /// Start a session at the first step, seeding the draft from `stored`.
    pub fn new(tenant_id: TenantId, admin_id: AdminId, stored: Option<TenantSettings>) -> Self {
        let draft = stored.unwrap_or_else(|| TenantSettings::empty(tenant_id));
        Self {
            tenant_id,
            admin_id,
            current_step: WizardStep::INITIAL,
            draft,
            offered: Vec::new(),
            started_at: Utc::now(),
            last_activity: Instant::now(),
        }
    }

    /// Record activity, postponing idle expiry.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    pub fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.idle_for() >= idle_timeout
    }
}

/// A tenant's session slot. Holding its lock serializes that tenant's events.
pub type SessionSlot = Arc<Mutex<Option<WizardSession>>>;

/// Map of tenant id to session slot.
///
/// The map lock is only held to look up or insert a slot, never across a
/// transition, so tenants proceed independently.
pub struct SessionRegistry {
    slots: Mutex<HashMap<TenantId, SessionSlot>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Get the tenant's slot, creating an empty one if needed.
    pub async fn slot(&self, tenant_id: TenantId) -> SessionSlot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(tenant_id).or_default())
    }

    /// Get the tenant's slot only if one exists.
    pub async fn existing(&self, tenant_id: TenantId) -> Option<SessionSlot> {
        self.slots.lock().await.get(&tenant_id).cloned()
    }

    /// Drop the session in a locked slot if it has been idle too long.
    ///
    /// Returns true if a session was discarded.
    pub fn expire_idle(&self, session: &mut Option<WizardSession>) -> bool {
        if session
            .as_ref()
            .is_some_and(|s| s.is_expired(self.idle_timeout))
        {
            *session = None;
            true
        } else {
            false
        }
    }

    /// Remove expired sessions and empty slots nobody is using.
    ///
    /// Slots that are locked or referenced by an in-flight event are left
    /// alone. Returns the number of expired sessions discarded.
    pub async fn sweep_expired(&self) -> usize {
        let idle_timeout = self.idle_timeout;
        let mut expired = 0;
        let mut slots = self.slots.lock().await;
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let Ok(mut guard) = slot.try_lock() else {
                return true;
            };
            if guard.as_ref().is_some_and(|s| s.is_expired(idle_timeout)) {
                *guard = None;
                expired += 1;
            }
            guard.is_some()
        });
        expired
    }

    /// Number of live (unexpired) sessions.
    pub async fn active_count(&self) -> usize {
        let slots: Vec<SessionSlot> = self.slots.lock().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot
                .lock()
                .await
                .as_ref()
                .is_some_and(|s| !s.is_expired(self.idle_timeout))
            {
                count += 1;
            }
        }
        count
    }

    /// Copy of the tenant's live session, if any.
    pub async fn snapshot(&self, tenant_id: TenantId) -> Option<WizardSession> {
        let slot = self.existing(tenant_id).await?;
        let guard = slot.lock().await;
        guard
            .as_ref()
            .filter(|s| !s.is_expired(self.idle_timeout))
            .cloned()
    }
}
