//! Administrator interactions fed into the wizard.

use serde::{Deserialize, Serialize};
use ticketdesk_core::{AdminId, EntityRef, TenantId};

use crate::step::WizardStep;

/// One interaction of an administrator with the setup wizard.
///
/// Serialized as a flat JSON object, e.g.
/// `{"tenant_id":1,"admin_id":7,"type":"select","step":"roles","selected":[...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardEvent {
    pub tenant_id: TenantId,
    pub admin_id: AdminId,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The setup command was invoked
    Start,
    /// A dropdown selection was submitted for `step`
    Select {
        step: WizardStep,
        selected: Vec<EntityRef>,
    },
    /// The "Finish Setup" button was pressed
    Confirm,
}

impl WizardEvent {
    pub fn start(tenant_id: TenantId, admin_id: AdminId) -> Self {
        Self {
            tenant_id,
            admin_id,
            kind: EventKind::Start,
        }
    }

    pub fn select(
        tenant_id: TenantId,
        admin_id: AdminId,
        step: WizardStep,
        selected: impl IntoIterator<Item = EntityRef>,
    ) -> Self {
        Self {
            tenant_id,
            admin_id,
            kind: EventKind::Select {
                step,
                selected: selected.into_iter().collect(),
            },
        }
    }

    pub fn confirm(tenant_id: TenantId, admin_id: AdminId) -> Self {
        Self {
            tenant_id,
            admin_id,
            kind: EventKind::Confirm,
        }
    }

    /// Short name of the event type, for logs.
    pub fn name(&self) -> &'static str {
        match self.kind {
            EventKind::Start => "start",
            EventKind::Select { .. } => "select",
            EventKind::Confirm => "confirm",
        }
    }
}
