//! End-to-end tests of the setup wizard against in-memory and SQLite stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::tempdir;
use ticketdesk_core::{AdminId, CategoryId, ChannelId, EntityKind, EntityRef, RoleId, TenantId};
use ticketdesk_store::{
    MemorySettingsStore, SettingsPatch, SettingsStore, SqliteSettingsStore, StoreError,
    TenantSettings,
};
use ticketdesk_wizard::error::GENERIC_FAILURE;
use ticketdesk_wizard::render::NOT_SELECTED;
use ticketdesk_wizard::{
    EntityDirectory, PlatformError, RecordingPublisher, RestartPolicy, StaleReason,
    StaticDirectory, ValidationError, WizardConfig, WizardEngine, WizardError, WizardEvent,
    WizardStep,
};

const ADMIN: AdminId = AdminId(500);

const C1: CategoryId = CategoryId(11);
const R1: RoleId = RoleId(21);
const R2: RoleId = RoleId(22);
const L1: ChannelId = ChannelId(31);
const P1: ChannelId = ChannelId(32);

fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_category(C1, "Support")
        .with_category(CategoryId(12), "Archive")
        .with_role(R1, "Moderator")
        .with_role(R2, "Helper")
        .with_text_channel(L1, "ticket-logs")
        .with_text_channel(P1, "open-a-ticket")
}

struct Harness {
    engine: WizardEngine,
    store: Arc<MemorySettingsStore>,
    publisher: Arc<RecordingPublisher>,
}

fn harness_with(config: WizardConfig) -> Harness {
    ticketdesk_core::logging::init_test_logging();
    let store = Arc::new(MemorySettingsStore::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let engine = WizardEngine::new(
        store.clone(),
        Arc::new(directory()),
        publisher.clone(),
        config,
    );
    Harness {
        engine,
        store,
        publisher,
    }
}

fn harness() -> Harness {
    harness_with(WizardConfig::default())
}

fn start(tenant: TenantId) -> WizardEvent {
    WizardEvent::start(tenant, ADMIN)
}

fn select(
    tenant: TenantId,
    step: WizardStep,
    selected: impl IntoIterator<Item = EntityRef>,
) -> WizardEvent {
    WizardEvent::select(tenant, ADMIN, step, selected)
}

fn confirm(tenant: TenantId) -> WizardEvent {
    WizardEvent::confirm(tenant, ADMIN)
}

/// Drive a tenant from start through all four selection steps.
async fn run_to_confirm(engine: &WizardEngine, tenant: TenantId) {
    engine.dispatch(&start(tenant)).await.unwrap();
    engine
        .dispatch(&select(
            tenant,
            WizardStep::Category,
            [EntityRef::category(C1)],
        ))
        .await
        .unwrap();
    engine
        .dispatch(&select(
            tenant,
            WizardStep::Roles,
            [EntityRef::role(R1), EntityRef::role(R2)],
        ))
        .await
        .unwrap();
    engine
        .dispatch(&select(
            tenant,
            WizardStep::LogChannel,
            [EntityRef::text_channel(L1)],
        ))
        .await
        .unwrap();
    engine
        .dispatch(&select(
            tenant,
            WizardStep::PublishChannel,
            [EntityRef::text_channel(P1)],
        ))
        .await
        .unwrap();
}

async fn current_step(engine: &WizardEngine, tenant: TenantId) -> Option<WizardStep> {
    engine
        .sessions()
        .snapshot(tenant)
        .await
        .map(|s| s.current_step)
}

#[tokio::test]
async fn test_full_setup_publishes_to_selected_channel() {
    let h = harness();
    let tenant = TenantId(1);

    run_to_confirm(&h.engine, tenant).await;
    assert_eq!(current_step(&h.engine, tenant).await, Some(WizardStep::Confirm));

    let reply = h.engine.dispatch(&confirm(tenant)).await.unwrap();
    assert_eq!(reply.notices().len(), 1);

    let published = h.publisher.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].channel, P1);
    assert_eq!(published[0].tenant_id, tenant);
    assert_eq!(published[0].payload.button_label, "Create Ticket");

    let stored = h.store.read(tenant).await.unwrap().unwrap();
    assert_eq!(stored.category, Some(C1));
    assert_eq!(stored.support_roles, [R1, R2].into_iter().collect());
    assert_eq!(stored.log_channel, Some(L1));
    assert_eq!(stored.publish_channel, Some(P1));
    assert!(stored.published_at.is_some());

    // Session is gone; a late confirmation is orphaned.
    assert!(h.engine.sessions().snapshot(tenant).await.is_none());
    let err = h.engine.dispatch(&confirm(tenant)).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::StaleInteraction {
            reason: StaleReason::NoSession
        }
    ));
    assert_eq!(h.publisher.published().await.len(), 1);
}

#[tokio::test]
async fn test_each_step_is_flushed_before_advancing() {
    let h = harness();
    let tenant = TenantId(2);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    assert!(h.store.read(tenant).await.unwrap().is_none());

    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();
    let stored = h.store.read(tenant).await.unwrap().unwrap();
    assert_eq!(stored.category, Some(C1));
    assert!(stored.support_roles.is_empty());
    assert_eq!(stored.log_channel, None);
    assert_eq!(stored.publish_channel, None);

    h.engine
        .dispatch(&select(tenant, WizardStep::Roles, [EntityRef::role(R2)]))
        .await
        .unwrap();
    let stored = h.store.read(tenant).await.unwrap().unwrap();
    assert_eq!(stored.category, Some(C1));
    assert_eq!(stored.support_roles, [R2].into_iter().collect());
    assert_eq!(stored.log_channel, None);
    assert_eq!(h.store.write_count(), 2);
}

#[tokio::test]
async fn test_summary_shows_stored_values_and_placeholders() {
    let h = harness();
    let tenant = TenantId(3);

    // A previous run left a log channel behind.
    h.store
        .upsert(tenant, &SettingsPatch::new().log_channel(L1))
        .await
        .unwrap();

    run_to_confirm(&h.engine, tenant).await;
    h.store
        .upsert(tenant, &SettingsPatch::new().category(CategoryId(12)))
        .await
        .unwrap();

    // Re-render at confirm reads the store, not the draft.
    let reply = h.engine.dispatch(&start(tenant)).await.unwrap();
    let summary = reply.summary().unwrap();
    assert_eq!(
        summary.field("Ticket Category").unwrap().value.to_string(),
        "<#12>"
    );
    assert_eq!(
        summary.field("Support Roles").unwrap().value.to_string(),
        "<@&21>, <@&22>"
    );

    let empty = harness();
    let other = TenantId(4);
    empty
        .store
        .upsert(other, &SettingsPatch::new().publish_channel(P1))
        .await
        .unwrap();
    let summary = ticketdesk_wizard::Summary::from_settings(
        other,
        empty.store.read(other).await.unwrap().as_ref(),
    );
    assert_eq!(
        summary.field("Log Channel").unwrap().value.to_string(),
        NOT_SELECTED
    );
}

#[tokio::test]
async fn test_stale_step_never_mutates_state() {
    let h = harness();
    let tenant = TenantId(5);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();
    let before = h.store.read(tenant).await.unwrap();
    let writes = h.store.write_count();

    // Replay of the category dropdown after the session moved on.
    let err = h
        .engine
        .dispatch(&select(
            tenant,
            WizardStep::Category,
            [EntityRef::category(CategoryId(12))],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::StaleInteraction {
            reason: StaleReason::StepMismatch {
                current: WizardStep::Roles,
                got: WizardStep::Category
            }
        }
    ));
    assert_eq!(h.store.read(tenant).await.unwrap(), before);
    assert_eq!(h.store.write_count(), writes);
    assert_eq!(current_step(&h.engine, tenant).await, Some(WizardStep::Roles));

    // Through `handle`, the current step is re-rendered without a notice.
    let reply = h
        .engine
        .handle(&select(
            tenant,
            WizardStep::LogChannel,
            [EntityRef::text_channel(L1)],
        ))
        .await;
    assert!(reply.notices().is_empty());
    assert_eq!(reply.prompt().unwrap().step, WizardStep::Roles);
    assert_eq!(h.store.write_count(), writes);
}

#[tokio::test]
async fn test_orphaned_interaction_is_rejected() {
    let h = harness();
    let tenant = TenantId(6);

    let err = h
        .engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::StaleInteraction {
            reason: StaleReason::NoSession
        }
    ));
    assert!(h.store.read(tenant).await.unwrap().is_none());

    let reply = h.engine.handle(&confirm(tenant)).await;
    assert_eq!(reply.notices().len(), 1);
    assert!(h.publisher.published().await.is_empty());
}

#[tokio::test]
async fn test_confirm_without_publish_channel_is_incomplete() {
    let h = harness();
    let tenant = TenantId(7);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();

    let err = h.engine.dispatch(&confirm(tenant)).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::ConfigurationIncomplete {
            missing: "publish_channel"
        }
    ));
    assert!(h.publisher.published().await.is_empty());
    assert_eq!(current_step(&h.engine, tenant).await, Some(WizardStep::Roles));

    let reply = h.engine.handle(&confirm(tenant)).await;
    assert_eq!(
        reply.notices()[0].message,
        "⚠️ Ticket UI channel is not selected! Please complete the setup."
    );
}

#[tokio::test]
async fn test_early_confirm_with_stored_channel_is_stale() {
    let h = harness();
    let tenant = TenantId(8);

    // Channel stored by an earlier, abandoned run.
    h.store
        .upsert(tenant, &SettingsPatch::new().publish_channel(P1))
        .await
        .unwrap();
    h.engine.dispatch(&start(tenant)).await.unwrap();

    let err = h.engine.dispatch(&confirm(tenant)).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::StaleInteraction {
            reason: StaleReason::NotAwaitingConfirmation {
                current: WizardStep::Category
            }
        }
    ));
    assert!(h.publisher.published().await.is_empty());

    let session = h.engine.sessions().snapshot(tenant).await.unwrap();
    assert_eq!(session.draft.publish_channel, Some(P1));
}

#[tokio::test]
async fn test_persistence_failure_keeps_step_and_allows_retry() {
    let h = harness();
    let tenant = TenantId(9);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    h.store.set_unavailable(true);

    let event = select(tenant, WizardStep::Category, [EntityRef::category(C1)]);
    let err = h.engine.dispatch(&event).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::Persistence {
            step: WizardStep::Category,
            ..
        }
    ));
    assert!(err.is_retryable());
    let session = h.engine.sessions().snapshot(tenant).await.unwrap();
    assert_eq!(session.current_step, WizardStep::Category);
    assert_eq!(session.draft.category, None);

    h.store.set_unavailable(false);
    let reply = h.engine.dispatch(&event).await.unwrap();
    assert_eq!(reply.prompt().unwrap().step, WizardStep::Roles);
    assert_eq!(
        h.store.read(tenant).await.unwrap().unwrap().category,
        Some(C1)
    );
}

#[tokio::test]
async fn test_publish_failure_keeps_record_and_allows_retry() {
    let h = harness();
    let tenant = TenantId(10);

    run_to_confirm(&h.engine, tenant).await;
    h.publisher
        .fail_with(PlatformError::MissingPermission {
            channel: P1,
            permission: "SEND_MESSAGES".into(),
        })
        .await;

    let err = h.engine.dispatch(&confirm(tenant)).await.unwrap_err();
    assert!(matches!(err, WizardError::PublishDelegate { channel, .. } if channel == P1));
    assert_eq!(current_step(&h.engine, tenant).await, Some(WizardStep::Confirm));
    let stored = h.store.read(tenant).await.unwrap().unwrap();
    assert!(stored.is_complete());
    assert!(stored.published_at.is_none());

    h.publisher.succeed().await;
    h.engine.dispatch(&confirm(tenant)).await.unwrap();
    assert_eq!(h.publisher.published().await.len(), 1);
    assert!(h.engine.sessions().snapshot(tenant).await.is_none());
}

/// Store whose publish marks always fail.
struct UnmarkableStore {
    inner: MemorySettingsStore,
}

#[async_trait]
impl SettingsStore for UnmarkableStore {
    async fn upsert(
        &self,
        tenant_id: TenantId,
        patch: &SettingsPatch,
    ) -> ticketdesk_store::Result<()> {
        self.inner.upsert(tenant_id, patch).await
    }

    async fn read(&self, tenant_id: TenantId) -> ticketdesk_store::Result<Option<TenantSettings>> {
        self.inner.read(tenant_id).await
    }

    async fn mark_published(
        &self,
        _tenant_id: TenantId,
        _at: DateTime<Utc>,
    ) -> ticketdesk_store::Result<()> {
        Err(StoreError::Unavailable("read-only replica".into()))
    }
}

#[tokio::test]
async fn test_unrecorded_publish_time_still_completes() {
    let publisher = Arc::new(RecordingPublisher::new());
    let engine = WizardEngine::new(
        Arc::new(UnmarkableStore {
            inner: MemorySettingsStore::new(),
        }),
        Arc::new(directory()),
        publisher.clone(),
        WizardConfig::default(),
    );
    let tenant = TenantId(11);

    run_to_confirm(&engine, tenant).await;
    engine.dispatch(&confirm(tenant)).await.unwrap();
    assert_eq!(publisher.published().await.len(), 1);
    assert!(engine.sessions().snapshot(tenant).await.is_none());
}

#[tokio::test]
async fn test_validation_rejects_bad_selections() {
    let h = harness_with(WizardConfig::default().with_max_support_roles(1));
    let tenant = TenantId(12);

    h.engine.dispatch(&start(tenant)).await.unwrap();

    let err = h
        .engine
        .dispatch(&select(tenant, WizardStep::Category, Vec::<EntityRef>::new()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation {
            source: ValidationError::EmptySelection,
            ..
        }
    ));

    let err = h
        .engine
        .dispatch(&select(
            tenant,
            WizardStep::Category,
            [EntityRef::text_channel(L1)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation {
            source: ValidationError::WrongKind { .. },
            ..
        }
    ));

    let err = h
        .engine
        .dispatch(&select(
            tenant,
            WizardStep::Category,
            [EntityRef::category(CategoryId(99))],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation {
            source: ValidationError::NotOffered { id: 99 },
            ..
        }
    ));
    assert_eq!(h.store.write_count(), 0);

    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();

    let err = h
        .engine
        .dispatch(&select(
            tenant,
            WizardStep::Roles,
            [EntityRef::role(R1), EntityRef::role(R2)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation {
            source: ValidationError::TooMany { max: 1, got: 2 },
            ..
        }
    ));

    // Through `handle` the administrator sees a warning and the same prompt.
    let reply = h
        .engine
        .handle(&select(tenant, WizardStep::Roles, Vec::<EntityRef>::new()))
        .await;
    assert_eq!(reply.notices().len(), 1);
    assert_eq!(reply.prompt().unwrap().step, WizardStep::Roles);
    assert_eq!(reply.prompt().unwrap().max_values, 1);
    assert_eq!(current_step(&h.engine, tenant).await, Some(WizardStep::Roles));
}

#[tokio::test]
async fn test_idle_session_expires() {
    let h = harness_with(WizardConfig::default().with_idle_timeout(Duration::from_millis(50)));
    let tenant = TenantId(13);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = h
        .engine
        .dispatch(&select(tenant, WizardStep::Roles, [EntityRef::role(R1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::StaleInteraction {
            reason: StaleReason::NoSession
        }
    ));

    // A fresh start begins at the category step; stored values survive.
    let reply = h.engine.dispatch(&start(tenant)).await.unwrap();
    assert_eq!(reply.prompt().unwrap().step, WizardStep::Category);
    let session = h.engine.sessions().snapshot(tenant).await.unwrap();
    assert_eq!(session.draft.category, Some(C1));
}

#[tokio::test]
async fn test_start_sweeps_other_tenants() {
    let h = harness_with(WizardConfig::default().with_idle_timeout(Duration::from_millis(50)));

    h.engine.dispatch(&start(TenantId(20))).await.unwrap();
    h.engine.dispatch(&start(TenantId(21))).await.unwrap();
    assert_eq!(h.engine.sessions().active_count().await, 2);

    tokio::time::sleep(Duration::from_millis(100)).await;

    h.engine.dispatch(&start(TenantId(22))).await.unwrap();
    assert_eq!(h.engine.sessions().active_count().await, 1);
    assert!(h.engine.sessions().existing(TenantId(20)).await.is_none());
}

#[tokio::test]
async fn test_start_resumes_by_default() {
    let h = harness();
    let tenant = TenantId(14);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();

    let reply = h.engine.dispatch(&start(tenant)).await.unwrap();
    assert_eq!(reply.prompt().unwrap().step, WizardStep::Roles);
    assert_eq!(current_step(&h.engine, tenant).await, Some(WizardStep::Roles));
}

#[tokio::test]
async fn test_start_restarts_when_configured() {
    let h = harness_with(WizardConfig::default().with_restart_policy(RestartPolicy::Restart));
    let tenant = TenantId(15);

    h.engine.dispatch(&start(tenant)).await.unwrap();
    h.engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap();

    let reply = h.engine.dispatch(&start(tenant)).await.unwrap();
    assert_eq!(reply.prompt().unwrap().step, WizardStep::Category);
    // The restarted draft is seeded from what was already stored.
    let session = h.engine.sessions().snapshot(tenant).await.unwrap();
    assert_eq!(session.draft.category, Some(C1));
}

#[tokio::test]
async fn test_directory_failure_is_generic() {
    struct DownDirectory;

    #[async_trait]
    impl EntityDirectory for DownDirectory {
        async fn options(
            &self,
            _tenant_id: TenantId,
            _kind: ticketdesk_core::EntityKind,
        ) -> Result<Vec<ticketdesk_core::EntityOption>, PlatformError> {
            Err(PlatformError::Unavailable("gateway timeout".into()))
        }
    }

    let engine = WizardEngine::new(
        Arc::new(MemorySettingsStore::new()),
        Arc::new(DownDirectory),
        Arc::new(RecordingPublisher::new()),
        WizardConfig::default(),
    );
    let tenant = TenantId(16);

    let reply = engine.handle(&start(tenant)).await;
    assert_eq!(reply.notices()[0].message, GENERIC_FAILURE);
    assert!(engine.sessions().snapshot(tenant).await.is_none());
}

/// Directory whose role lookup can be switched off.
struct FlakyRoleDirectory {
    inner: StaticDirectory,
    roles_down: AtomicBool,
}

#[async_trait]
impl EntityDirectory for FlakyRoleDirectory {
    async fn options(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
    ) -> Result<Vec<ticketdesk_core::EntityOption>, PlatformError> {
        if kind == EntityKind::Role && self.roles_down.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("gateway timeout".into()));
        }
        self.inner.options(tenant_id, kind).await
    }
}

#[tokio::test]
async fn test_failed_prompt_does_not_keep_previous_options() {
    let directory = Arc::new(FlakyRoleDirectory {
        inner: directory(),
        roles_down: AtomicBool::new(true),
    });
    let store = Arc::new(MemorySettingsStore::new());
    let engine = WizardEngine::new(
        store.clone(),
        directory.clone(),
        Arc::new(RecordingPublisher::new()),
        WizardConfig::default(),
    );
    let tenant = TenantId(17);

    engine.dispatch(&start(tenant)).await.unwrap();
    let err = engine
        .dispatch(&select(tenant, WizardStep::Category, [EntityRef::category(C1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Directory {
            kind: EntityKind::Role,
            ..
        }
    ));

    // The category was accepted, but no category options linger at roles.
    let session = engine.sessions().snapshot(tenant).await.unwrap();
    assert_eq!(session.current_step, WizardStep::Roles);
    assert!(session.offered.is_empty());
    assert_eq!(store.read(tenant).await.unwrap().unwrap().category, Some(C1));

    // While roles are still unavailable the selection fails the same way.
    let err = engine
        .dispatch(&select(tenant, WizardStep::Roles, [EntityRef::role(R1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::Directory { .. }));
    assert!(store.read(tenant).await.unwrap().unwrap().support_roles.is_empty());

    // Once the directory recovers, the role selection validates against fresh options.
    directory.roles_down.store(false, Ordering::SeqCst);
    let reply = engine
        .dispatch(&select(tenant, WizardStep::Roles, [EntityRef::role(R1)]))
        .await
        .unwrap();
    assert_eq!(reply.prompt().unwrap().step, WizardStep::LogChannel);
    let stored = store.read(tenant).await.unwrap().unwrap();
    assert!(stored.support_roles.contains(&R1));
    assert_eq!(stored.support_roles.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tenants_are_isolated_under_concurrency() {
    let h = Arc::new(harness());
    let tenants: Vec<TenantId> = (100..108).map(TenantId).collect();

    let mut handles = Vec::new();
    for (i, tenant) in tenants.iter().copied().enumerate() {
        let h = Arc::clone(&h);
        handles.push(tokio::spawn(async move {
            h.engine.dispatch(&start(tenant)).await.unwrap();
            let category = if i % 2 == 0 { C1 } else { CategoryId(12) };
            h.engine
                .dispatch(&select(
                    tenant,
                    WizardStep::Category,
                    [EntityRef::category(category)],
                ))
                .await
                .unwrap();
            if i % 2 == 0 {
                h.engine
                    .dispatch(&select(tenant, WizardStep::Roles, [EntityRef::role(R1)]))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for (i, tenant) in tenants.iter().copied().enumerate() {
        let stored = h.store.read(tenant).await.unwrap().unwrap();
        let expected_step = if i % 2 == 0 {
            assert_eq!(stored.category, Some(C1));
            assert_eq!(stored.support_roles, [R1].into_iter().collect());
            WizardStep::LogChannel
        } else {
            assert_eq!(stored.category, Some(CategoryId(12)));
            assert!(stored.support_roles.is_empty());
            WizardStep::Roles
        };
        assert_eq!(current_step(&h.engine, tenant).await, Some(expected_step));
    }
}

#[tokio::test]
async fn test_flow_against_sqlite_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ticket_settings.db");
    let tenant = TenantId(17);
    let publisher = Arc::new(RecordingPublisher::new());

    {
        let store = Arc::new(SqliteSettingsStore::open(&path).unwrap());
        let engine = WizardEngine::new(
            store,
            Arc::new(directory()),
            publisher.clone(),
            WizardConfig::default(),
        );
        run_to_confirm(&engine, tenant).await;
        engine.dispatch(&confirm(tenant)).await.unwrap();
    }

    let store = SqliteSettingsStore::open(&path).unwrap();
    let stored = store.read(tenant).await.unwrap().unwrap();
    assert!(stored.is_complete());
    assert_eq!(stored.publish_channel, Some(P1));
    assert!(stored.published_at.is_some());
    assert_eq!(publisher.published().await[0].channel, P1);
}
