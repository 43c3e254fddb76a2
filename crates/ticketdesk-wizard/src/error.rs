//! Error types for the setup wizard.
//!
//! Every failure a step or the confirmation can hit is one [`WizardError`]
//! variant. The engine turns each of them into a user-visible [`Notice`] at a
//! single boundary ([`WizardEngine::handle`](crate::WizardEngine::handle)), so
//! no step carries its own recovery code.

use thiserror::Error;
use ticketdesk_core::{ChannelId, EntityKind, TicketdeskError};
use ticketdesk_store::StoreError;

use crate::platform::PlatformError;
use crate::render::Notice;
use crate::step::WizardStep;

/// Generic notice shown for faults the administrator cannot act on.
pub const GENERIC_FAILURE: &str = "⚠️ An error occurred! Please try again later.";

/// Why a selection was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no entity selected")]
    EmptySelection,

    #[error("{got} entities selected, at most {max} allowed")]
    TooMany { max: usize, got: usize },

    #[error("expected a {expected}, got a {got}")]
    WrongKind { expected: EntityKind, got: EntityKind },

    #[error("{id} was selected more than once")]
    Duplicate { id: u64 },

    #[error("{id} is not one of the offered options")]
    NotOffered { id: u64 },

    #[error("step {0} does not take a selection")]
    NotASelectionStep(WizardStep),
}

/// Why an interaction no longer applies to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// No live session for the tenant (never started, finished, or expired)
    NoSession,
    /// The event targets a different step than the session is at
    StepMismatch { current: WizardStep, got: WizardStep },
    /// Confirmation arrived before the session reached the confirm step
    NotAwaitingConfirmation { current: WizardStep },
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSession => write!(f, "no active setup session"),
            Self::StepMismatch { current, got } => {
                write!(f, "event for step {} while session is at {}", got, current)
            }
            Self::NotAwaitingConfirmation { current } => {
                write!(f, "confirmation while session is at {}", current)
            }
        }
    }
}

/// Setup wizard errors.
#[derive(Debug, Error)]
pub enum WizardError {
    /// Selection does not fit the step
    #[error("invalid selection for step {step}: {source}")]
    Validation {
        step: WizardStep,
        #[source]
        source: ValidationError,
    },

    /// Event does not match the session (or there is no session)
    #[error("stale interaction: {reason}")]
    StaleInteraction { reason: StaleReason },

    /// Settings store read or write failed; session left unchanged
    #[error("settings could not be persisted at step {step}: {source}")]
    Persistence {
        step: WizardStep,
        #[source]
        source: StoreError,
    },

    /// Publish attempted while a required field is unset
    #[error("configuration incomplete: {missing} is not selected")]
    ConfigurationIncomplete { missing: &'static str },

    /// Posting the entry point failed
    #[error("publishing the entry point to channel {channel} failed: {source}")]
    PublishDelegate {
        channel: ChannelId,
        #[source]
        source: PlatformError,
    },

    /// Selectable options could not be fetched
    #[error("could not list {kind} options: {source}")]
    Directory {
        kind: EntityKind,
        #[source]
        source: PlatformError,
    },

    /// Internal error (bug in ticketdesk)
    #[error("internal error: {message}")]
    Internal { message: String },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] TicketdeskError),
}

impl WizardError {
    pub fn validation(step: WizardStep, source: ValidationError) -> Self {
        Self::Validation { step, source }
    }

    pub fn stale(reason: StaleReason) -> Self {
        Self::StaleInteraction { reason }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::StaleInteraction { .. } => "stale_interaction",
            Self::Persistence { .. } => "persistence",
            Self::ConfigurationIncomplete { .. } => "configuration_incomplete",
            Self::PublishDelegate { .. } => "publish_delegate",
            Self::Directory { .. } => "directory",
            Self::Internal { .. } => "internal",
            Self::Config(_) => "config",
        }
    }

    /// Returns true if repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::PublishDelegate { .. } | Self::Directory { .. }
        )
    }

    /// Returns true for faults outside the wizard's error taxonomy.
    ///
    /// These are logged with full detail and shown as a generic notice.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Directory { .. } | Self::Internal { .. } | Self::Config(_)
        )
    }

    /// The notice shown to the administrator, if any.
    ///
    /// A step mismatch is recovered silently by re-rendering the current step.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Validation { source, .. } => Some(Notice::warning(format!(
                "⚠️ That selection can't be used: {}. Please choose again.",
                source
            ))),
            Self::StaleInteraction {
                reason: StaleReason::NoSession,
            } => Some(Notice::info(
                "⌛ This setup session is no longer active. Run `/ticket setup` to start again.",
            )),
            Self::StaleInteraction { .. } => None,
            Self::Persistence { source, .. } => Some(Notice::error(format!(
                "⚠️ {} Your previous selections are kept.",
                source.friendly_message()
            ))),
            Self::ConfigurationIncomplete { .. } => Some(Notice::warning(
                "⚠️ Ticket UI channel is not selected! Please complete the setup.",
            )),
            Self::PublishDelegate { source, .. } => Some(Notice::error(format!(
                "⚠️ The ticket panel could not be posted: {}. Check the channel and try again.",
                source.friendly_message()
            ))),
            Self::Directory { .. } | Self::Internal { .. } | Self::Config(_) => {
                Some(Notice::error(GENERIC_FAILURE))
            }
        }
    }
}

/// Result type for wizard operations.
pub type Result<T> = std::result::Result<T, WizardError>;
