//! Render requests produced by the wizard.
//!
//! The engine does not draw anything itself. Each transition returns a
//! [`Reply`] whose [`Render`] items the presentation layer turns into
//! dropdowns, embeds and ephemeral messages.

use serde::{Deserialize, Serialize};
use ticketdesk_core::{EntityOption, EntityRef, TenantId};
use ticketdesk_store::TenantSettings;

use crate::step::WizardStep;

/// Placeholder for a field that has no value yet.
pub const NOT_SELECTED: &str = "Not selected";

/// A dropdown prompt for one selection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPrompt {
    pub step: WizardStep,
    pub title: String,
    pub placeholder: String,
    /// Offered options, labels already prefixed with the step icon
    pub options: Vec<EntityOption>,
    pub min_values: usize,
    pub max_values: usize,
}

impl StepPrompt {
    pub fn new(step: WizardStep, options: &[EntityOption], max_support_roles: usize) -> Self {
        let icon = step.option_icon();
        let max_values = step.max_values(max_support_roles).min(options.len().max(1));
        Self {
            step,
            title: step.prompt_title().to_string(),
            placeholder: step.placeholder().to_string(),
            options: options
                .iter()
                .map(|o| EntityOption::new(o.entity, format!("{} {}", icon, o.label)))
                .collect(),
            min_values: 1,
            max_values,
        }
    }
}

/// Value of one summary field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Selected(Vec<EntityRef>),
    NotSelected,
}

impl FieldValue {
    fn from_refs(refs: Vec<EntityRef>) -> Self {
        if refs.is_empty() {
            FieldValue::NotSelected
        } else {
            FieldValue::Selected(refs)
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, FieldValue::Selected(_))
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Selected(refs) => {
                let mentions: Vec<String> = refs.iter().map(EntityRef::mention).collect();
                write!(f, "{}", mentions.join(", "))
            }
            FieldValue::NotSelected => write!(f, "{}", NOT_SELECTED),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryField {
    pub label: String,
    pub value: FieldValue,
}

/// Final review of the stored settings, with the confirmation button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub description: String,
    pub fields: Vec<SummaryField>,
    pub confirm_label: String,
}

impl Summary {
    /// Build the summary of a stored record (`None` = nothing stored yet).
    pub fn from_settings(tenant_id: TenantId, settings: Option<&TenantSettings>) -> Self {
        let empty = TenantSettings::empty(tenant_id);
        let settings = settings.unwrap_or(&empty);

        let fields = vec![
            SummaryField {
                label: "📁 Ticket Category".to_string(),
                value: FieldValue::from_refs(
                    settings.category.map(EntityRef::category).into_iter().collect(),
                ),
            },
            SummaryField {
                label: "👤 Support Roles".to_string(),
                value: FieldValue::from_refs(
                    settings
                        .support_roles
                        .iter()
                        .copied()
                        .map(EntityRef::role)
                        .collect(),
                ),
            },
            SummaryField {
                label: "📄 Log Channel".to_string(),
                value: FieldValue::from_refs(
                    settings
                        .log_channel
                        .map(EntityRef::text_channel)
                        .into_iter()
                        .collect(),
                ),
            },
            SummaryField {
                label: "💬 Ticket UI Channel".to_string(),
                value: FieldValue::from_refs(
                    settings
                        .publish_channel
                        .map(EntityRef::text_channel)
                        .into_iter()
                        .collect(),
                ),
            },
        ];

        Self {
            title: "🎫 Ticket System Summary".to_string(),
            description: "Here are your ticket system settings:".to_string(),
            fields,
            confirm_label: "Finish Setup".to_string(),
        }
    }

    /// Look up a field by its label (without the icon).
    pub fn field(&self, name: &str) -> Option<&SummaryField> {
        self.fields.iter().find(|f| f.label.ends_with(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// An ephemeral message to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// One thing for the presentation layer to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "render", rename_all = "snake_case")]
pub enum Render {
    Prompt(StepPrompt),
    Summary(Summary),
    Notice(Notice),
}

/// Everything the engine wants shown in response to one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub renders: Vec<Render>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, render: Render) -> Self {
        self.renders.push(render);
        self
    }

    pub fn with_notice(self, notice: Notice) -> Self {
        self.with(Render::Notice(notice))
    }

    /// Append the renders of another reply.
    pub fn merge(mut self, other: Reply) -> Self {
        self.renders.extend(other.renders);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.renders.is_empty()
    }

    /// The step prompt in this reply, if any.
    pub fn prompt(&self) -> Option<&StepPrompt> {
        self.renders.iter().find_map(|r| match r {
            Render::Prompt(p) => Some(p),
            _ => None,
        })
    }

    /// The summary in this reply, if any.
    pub fn summary(&self) -> Option<&Summary> {
        self.renders.iter().find_map(|r| match r {
            Render::Summary(s) => Some(s),
            _ => None,
        })
    }

    /// All notices in this reply.
    pub fn notices(&self) -> Vec<&Notice> {
        self.renders
            .iter()
            .filter_map(|r| match r {
                Render::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}
