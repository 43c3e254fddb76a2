//! The setup wizard state machine.
//!
//! [`WizardEngine`] owns the per-tenant sessions and drives them through
//! `category → roles → log_channel → publish_channel → confirm → done`.
//! Each completed step is flushed to the [`SettingsStore`] before the session
//! advances, so the durable record always holds the latest accepted values.

use std::sync::Arc;

use chrono::Utc;
use ticketdesk_core::{AdminId, EntityRef, TenantId, log_wizard_event};
use ticketdesk_store::SettingsStore;
use tracing::{debug, error, info, warn};

use crate::config::{RestartPolicy, WizardConfig};
use crate::error::{GENERIC_FAILURE, Result, StaleReason, WizardError};
use crate::event::{EventKind, WizardEvent};
use crate::platform::{EntityDirectory, EntryPointPublisher, PublishRequest};
use crate::render::{Notice, Render, Reply, StepPrompt, Summary};
use crate::selection::validate_selection;
use crate::session::{SessionRegistry, WizardSession};
use crate::step::WizardStep;

/// Notice shown when a new session starts.
pub const STARTED_NOTICE: &str =
    "🎛️ **Ticket configuration** has been started. Please follow the instructions.";

/// Notice shown when an existing session is resumed.
pub const RESUMED_NOTICE: &str =
    "🎛️ **Ticket configuration** is already in progress. Continuing where you left off.";

/// Notice shown after the entry point was published.
pub const COMPLETED_NOTICE: &str =
    "✅ **Ticket system setup** has been completed successfully!";

/// Drives tenant setup sessions.
pub struct WizardEngine {
    store: Arc<dyn SettingsStore>,
    directory: Arc<dyn EntityDirectory>,
    publisher: Arc<dyn EntryPointPublisher>,
    sessions: SessionRegistry,
    config: WizardConfig,
}

impl WizardEngine {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        directory: Arc<dyn EntityDirectory>,
        publisher: Arc<dyn EntryPointPublisher>,
        config: WizardConfig,
    ) -> Self {
        Self {
            store,
            directory,
            publisher,
            sessions: SessionRegistry::new(config.idle_timeout),
            config,
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Process one event and return what to show.
    ///
    /// Never fails: every [`WizardError`] is logged and turned into a notice
    /// here, and stale interactions re-render the step the session is at.
    pub async fn handle(&self, event: &WizardEvent) -> Reply {
        match self.dispatch(event).await {
            Ok(reply) => reply,
            Err(err) => self.recover(event, err).await,
        }
    }

    /// Process one event, returning the typed error on failure.
    pub async fn dispatch(&self, event: &WizardEvent) -> Result<Reply> {
        debug!(
            tenant_id = %event.tenant_id,
            admin_id = %event.admin_id,
            event = event.name(),
            "Dispatching wizard event"
        );
        match &event.kind {
            EventKind::Start => self.start(event.tenant_id, event.admin_id).await,
            EventKind::Select { step, selected } => {
                self.select(event.tenant_id, event.admin_id, *step, selected)
                    .await
            }
            EventKind::Confirm => self.confirm(event.tenant_id).await,
        }
    }

    async fn start(&self, tenant_id: TenantId, admin_id: AdminId) -> Result<Reply> {
        let swept = self.sessions.sweep_expired().await;
        if swept > 0 {
            info!(swept, "Discarded idle setup sessions");
        }

        let slot = self.sessions.slot(tenant_id).await;
        let mut guard = slot.lock().await;
        if self.sessions.expire_idle(&mut guard) {
            log_wizard_event!(tenant_id, "expired");
        }

        if let Some(session) = guard.as_mut()
            && self.config.restart_policy == RestartPolicy::Resume
        {
            session.admin_id = admin_id;
            session.touch();
            log_wizard_event!(tenant_id, "resumed", step = %session.current_step);
            let current = self.present(session).await?;
            return Ok(Reply::new()
                .with_notice(Notice::info(RESUMED_NOTICE))
                .merge(current));
        }

        let stored = self
            .store
            .read(tenant_id)
            .await
            .map_err(|source| WizardError::Persistence {
                step: WizardStep::INITIAL,
                source,
            })?;
        let mut session = WizardSession::new(tenant_id, admin_id, stored);
        let prompt = self.present(&mut session).await?;

        let restarted = guard.replace(session).is_some();
        log_wizard_event!(tenant_id, "started", admin_id = %admin_id, restarted = restarted);

        Ok(Reply::new()
            .with_notice(Notice::info(STARTED_NOTICE))
            .merge(prompt))
    }

    async fn select(
        &self,
        tenant_id: TenantId,
        admin_id: AdminId,
        step: WizardStep,
        selected: &[EntityRef],
    ) -> Result<Reply> {
        let slot = self
            .sessions
            .existing(tenant_id)
            .await
            .ok_or(WizardError::stale(StaleReason::NoSession))?;
        let mut guard = slot.lock().await;
        if self.sessions.expire_idle(&mut guard) {
            log_wizard_event!(tenant_id, "expired");
        }
        let session = guard
            .as_mut()
            .ok_or(WizardError::stale(StaleReason::NoSession))?;

        if session.current_step != step {
            return Err(WizardError::stale(StaleReason::StepMismatch {
                current: session.current_step,
                got: step,
            }));
        }

        // The prompt for this step failed to render, so nothing was offered yet.
        if session.offered.is_empty()
            && let Some(kind) = step.entity_kind()
        {
            session.offered = self
                .directory
                .options(tenant_id, kind)
                .await
                .map_err(|source| WizardError::Directory { kind, source })?;
        }

        let patch = validate_selection(
            step,
            selected,
            &session.offered,
            self.config.max_support_roles,
        )
        .map_err(|source| WizardError::validation(step, source))?;

        self.store
            .upsert(tenant_id, &patch)
            .await
            .map_err(|source| WizardError::Persistence { step, source })?;

        let next = step
            .next()
            .ok_or_else(|| WizardError::internal(format!("no step after {}", step)))?;
        session.draft.apply(&patch);
        session.current_step = next;
        session.admin_id = admin_id;
        session.touch();
        log_wizard_event!(
            tenant_id,
            "step_completed",
            step = %step,
            next = %next,
            fields = ?patch.field_names()
        );

        self.present(session).await
    }

    async fn confirm(&self, tenant_id: TenantId) -> Result<Reply> {
        let slot = self
            .sessions
            .existing(tenant_id)
            .await
            .ok_or(WizardError::stale(StaleReason::NoSession))?;
        let mut guard = slot.lock().await;
        if self.sessions.expire_idle(&mut guard) {
            log_wizard_event!(tenant_id, "expired");
        }
        let current = guard
            .as_ref()
            .map(|s| s.current_step)
            .ok_or(WizardError::stale(StaleReason::NoSession))?;

        let settings = self
            .store
            .read(tenant_id)
            .await
            .map_err(|source| WizardError::Persistence {
                step: current,
                source,
            })?;
        let channel = settings
            .as_ref()
            .and_then(|s| s.publish_channel)
            .ok_or(WizardError::ConfigurationIncomplete {
                missing: "publish_channel",
            })?;

        if current != WizardStep::Confirm {
            return Err(WizardError::stale(StaleReason::NotAwaitingConfirmation {
                current,
            }));
        }

        let request = PublishRequest {
            tenant_id,
            channel,
            payload: self.config.entry_point.payload(),
        };
        self.publisher
            .publish(&request)
            .await
            .map_err(|source| WizardError::PublishDelegate { channel, source })?;

        if let Some(session) = guard.as_mut() {
            session.current_step = WizardStep::Done;
        }
        if let Err(e) = self.store.mark_published(tenant_id, Utc::now()).await {
            warn!(
                tenant_id = %tenant_id,
                error = %e,
                "Entry point published but publish time not recorded"
            );
        }
        log_wizard_event!(tenant_id, "completed", channel = %channel);

        *guard = None;
        Ok(Reply::new().with_notice(Notice::success(COMPLETED_NOTICE)))
    }

    /// Render the step a session is at, refreshing its offered options.
    ///
    /// Options of the previous render are dropped first, so a failed lookup
    /// never leaves another step's options behind.
    async fn present(&self, session: &mut WizardSession) -> Result<Reply> {
        let step = session.current_step;
        session.offered.clear();
        if let Some(kind) = step.entity_kind() {
            let options = self
                .directory
                .options(session.tenant_id, kind)
                .await
                .map_err(|source| WizardError::Directory { kind, source })?;
            let prompt = StepPrompt::new(step, &options, self.config.max_support_roles);
            session.offered = options;
            return Ok(Reply::new().with(Render::Prompt(prompt)));
        }

        match step {
            WizardStep::Confirm => {
                let settings = self
                    .store
                    .read(session.tenant_id)
                    .await
                    .map_err(|source| WizardError::Persistence { step, source })?;
                let summary = Summary::from_settings(session.tenant_id, settings.as_ref());
                Ok(Reply::new().with(Render::Summary(summary)))
            }
            _ => Err(WizardError::internal(format!(
                "cannot present step {}",
                step
            ))),
        }
    }

    /// Re-render the tenant's current step, if a live session exists.
    async fn rerender(&self, tenant_id: TenantId) -> Result<Reply> {
        let Some(slot) = self.sessions.existing(tenant_id).await else {
            return Ok(Reply::new());
        };
        let mut guard = slot.lock().await;
        self.sessions.expire_idle(&mut guard);
        match guard.as_mut() {
            Some(session) => self.present(session).await,
            None => Ok(Reply::new()),
        }
    }

    /// Turn a failed transition into a reply.
    async fn recover(&self, event: &WizardEvent, err: WizardError) -> Reply {
        if err.is_unexpected() {
            error!(
                tenant_id = %event.tenant_id,
                event = event.name(),
                kind = err.kind(),
                error = %err,
                "Wizard event failed unexpectedly"
            );
        } else if err.is_retryable() {
            warn!(
                tenant_id = %event.tenant_id,
                event = event.name(),
                kind = err.kind(),
                error = %err,
                "Wizard event failed"
            );
        } else {
            info!(
                tenant_id = %event.tenant_id,
                event = event.name(),
                kind = err.kind(),
                error = %err,
                "Wizard event rejected"
            );
        }

        let mut reply = Reply::new();
        if let Some(notice) = err.notice() {
            reply = reply.with_notice(notice);
        }

        let show_current = matches!(
            err,
            WizardError::Validation { .. }
                | WizardError::StaleInteraction {
                    reason: StaleReason::StepMismatch { .. }
                        | StaleReason::NotAwaitingConfirmation { .. }
                }
        );
        if show_current {
            match self.rerender(event.tenant_id).await {
                Ok(current) => reply = reply.merge(current),
                Err(e) => {
                    error!(
                        tenant_id = %event.tenant_id,
                        error = %e,
                        "Failed to re-render current step"
                    );
                    reply = reply.with_notice(Notice::error(GENERIC_FAILURE));
                }
            }
        }
        reply
    }
}
