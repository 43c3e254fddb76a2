//! Validation of dropdown selections.

use std::collections::HashSet;

use ticketdesk_core::{CategoryId, ChannelId, EntityOption, EntityRef, RoleId};
use ticketdesk_store::SettingsPatch;

use crate::error::ValidationError;
use crate::step::WizardStep;

/// Check a selection against the step and the options that were offered,
/// and turn it into the settings patch for that step.
///
/// Checks run in a fixed order so the reported problem is deterministic:
/// step, emptiness, count, kind, duplicates, then membership.
pub fn validate_selection(
    step: WizardStep,
    selected: &[EntityRef],
    offered: &[EntityOption],
    max_support_roles: usize,
) -> Result<SettingsPatch, ValidationError> {
    let expected = step
        .entity_kind()
        .ok_or(ValidationError::NotASelectionStep(step))?;

    if selected.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let max = step.max_values(max_support_roles);
    if selected.len() > max {
        return Err(ValidationError::TooMany {
            max,
            got: selected.len(),
        });
    }

    if let Some(wrong) = selected.iter().find(|e| e.kind != expected) {
        return Err(ValidationError::WrongKind {
            expected,
            got: wrong.kind,
        });
    }

    let mut seen = HashSet::with_capacity(selected.len());
    for entity in selected {
        if !seen.insert(entity.id) {
            return Err(ValidationError::Duplicate { id: entity.id });
        }
    }

    if let Some(missing) = selected
        .iter()
        .find(|e| !offered.iter().any(|o| o.entity == **e))
    {
        return Err(ValidationError::NotOffered { id: missing.id });
    }

    let first = selected[0].id;
    let patch = match step {
        WizardStep::Category => SettingsPatch::new().category(CategoryId(first)),
        WizardStep::Roles => {
            SettingsPatch::new().support_roles(selected.iter().map(|e| RoleId(e.id)))
        }
        WizardStep::LogChannel => SettingsPatch::new().log_channel(ChannelId(first)),
        WizardStep::PublishChannel => SettingsPatch::new().publish_channel(ChannelId(first)),
        WizardStep::Confirm | WizardStep::Done => {
            return Err(ValidationError::NotASelectionStep(step));
        }
    };
    Ok(patch)
}
