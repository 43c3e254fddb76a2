//! # ticketdesk-wizard
//!
//! The guided setup flow that configures a tenant's ticket system.
//!
//! This crate provides:
//! - [`WizardEngine`] - Per-tenant state machine driven by [`WizardEvent`]s
//! - [`SessionRegistry`] - Tenant-keyed in-memory sessions with idle expiry
//! - [`EntityDirectory`] / [`EntryPointPublisher`] - Seams to the chat platform
//! - [`Render`] - What the presentation layer should show after each event
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ticketdesk_core::{AdminId, TenantId};
//! use ticketdesk_store::MemorySettingsStore;
//! use ticketdesk_wizard::{
//!     RecordingPublisher, StaticDirectory, WizardConfig, WizardEngine, WizardEvent,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = WizardEngine::new(
//!         Arc::new(MemorySettingsStore::new()),
//!         Arc::new(StaticDirectory::new()),
//!         Arc::new(RecordingPublisher::new()),
//!         WizardConfig::default(),
//!     );
//!
//!     let reply = engine
//!         .handle(&WizardEvent::start(TenantId(1), AdminId(2)))
//!         .await;
//!     println!("{:?}", reply);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod platform;
pub mod render;
pub mod selection;
pub mod session;
pub mod step;

// Re-export main types
pub use config::{EntryPointConfig, RestartPolicy, WizardConfig};
pub use engine::WizardEngine;
pub use error::{Result, StaleReason, ValidationError, WizardError};
pub use event::{EventKind, WizardEvent};
pub use platform::{
    EntityDirectory, EntryPointPayload, EntryPointPublisher, PlatformError, PublishRequest,
    RecordingPublisher, StaticDirectory,
};
pub use render::{FieldValue, Notice, NoticeLevel, Render, Reply, StepPrompt, Summary};
pub use session::{SessionRegistry, WizardSession};
pub use step::WizardStep;
