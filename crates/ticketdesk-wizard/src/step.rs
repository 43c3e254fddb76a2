//! The fixed step sequence of the setup wizard.

use serde::{Deserialize, Serialize};
use ticketdesk_core::EntityKind;

/// One state of the setup wizard.
///
/// The sequence is linear: `category → roles → log_channel → publish_channel
/// → confirm → done`. There is no branching and no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Pick the category tickets are created under
    Category,
    /// Pick the roles that handle tickets
    Roles,
    /// Pick the channel that receives ticket logs
    LogChannel,
    /// Pick the channel the "create ticket" entry point is posted to
    PublishChannel,
    /// Review the summary and confirm publication
    Confirm,
    /// Setup finished
    Done,
}

impl WizardStep {
    /// The step every new session starts at.
    pub const INITIAL: WizardStep = WizardStep::Category;

    /// All steps in order.
    pub fn all() -> [WizardStep; 6] {
        [
            WizardStep::Category,
            WizardStep::Roles,
            WizardStep::LogChannel,
            WizardStep::PublishChannel,
            WizardStep::Confirm,
            WizardStep::Done,
        ]
    }

    /// The step that follows this one, or `None` for `Done`.
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Category => Some(WizardStep::Roles),
            WizardStep::Roles => Some(WizardStep::LogChannel),
            WizardStep::LogChannel => Some(WizardStep::PublishChannel),
            WizardStep::PublishChannel => Some(WizardStep::Confirm),
            WizardStep::Confirm => Some(WizardStep::Done),
            WizardStep::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == WizardStep::Done
    }

    /// Returns true for the four steps that take a selection.
    pub fn is_selection_step(self) -> bool {
        self.entity_kind().is_some()
    }

    /// The kind of entity this step selects.
    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            WizardStep::Category => Some(EntityKind::Category),
            WizardStep::Roles => Some(EntityKind::Role),
            WizardStep::LogChannel | WizardStep::PublishChannel => Some(EntityKind::TextChannel),
            WizardStep::Confirm | WizardStep::Done => None,
        }
    }

    /// How many entities one selection may carry.
    pub fn max_values(self, max_support_roles: usize) -> usize {
        match self {
            WizardStep::Roles => max_support_roles,
            _ if self.is_selection_step() => 1,
            _ => 0,
        }
    }

    /// Heading shown above the step's dropdown.
    pub fn prompt_title(self) -> &'static str {
        match self {
            WizardStep::Category => "📁 **Select the category for tickets**",
            WizardStep::Roles => "👤 **Select the support roles**",
            WizardStep::LogChannel => "📄 **Select the log channel for tickets**",
            WizardStep::PublishChannel => "💬 **Select the channel for the ticket creation UI**",
            WizardStep::Confirm => "🎫 **Review your ticket system settings**",
            WizardStep::Done => "✅ **Ticket system setup complete**",
        }
    }

    /// Placeholder text of the step's dropdown.
    pub fn placeholder(self) -> &'static str {
        match self {
            WizardStep::Category => "Select the category for tickets...",
            WizardStep::Roles => "Select support roles...",
            WizardStep::LogChannel => "Select the log channel...",
            WizardStep::PublishChannel => "Select the ticket UI channel...",
            WizardStep::Confirm | WizardStep::Done => "",
        }
    }

    /// Icon prefixed to each option label.
    pub fn option_icon(self) -> &'static str {
        match self {
            WizardStep::Category => "📁",
            WizardStep::Roles => "👤",
            WizardStep::LogChannel => "📄",
            WizardStep::PublishChannel => "💬",
            WizardStep::Confirm | WizardStep::Done => "",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Roles => write!(f, "roles"),
            Self::LogChannel => write!(f, "log_channel"),
            Self::PublishChannel => write!(f, "publish_channel"),
            Self::Confirm => write!(f, "confirm"),
            Self::Done => write!(f, "done"),
        }
    }
}
