// src/edit.rs

use crate::status::StatusCatalog;

/// Outcome of committing an inline status edit. Illegal transitions are
/// reverted client-side and never reach the API.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEdit {
    Apply { to: String },
    Revert { to: String },
}

/// One selectable entry of the status editor dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChoice {
    pub key: String,
    pub label: String,
    pub enabled: bool,
}

/// Whether an inline edit of `field` may begin on a row whose current
/// status is `status`. A final status locks every field of the row; the
/// caller is expected to swallow the edit event entirely (prevent default,
/// stop propagation).
pub fn edit_permitted(catalog: &StatusCatalog, status: &str, _field: &str) -> bool {
    !catalog.is_final(status)
}

/// The status options the operator may pick from, given the row's current
/// status. Level-2 rows only advance to a final status, so everything else
/// is shown disabled; the current value stays visible but unselectable.
/// Final rows get an entirely disabled list.
pub fn status_choices(catalog: &StatusCatalog, current: &str) -> Vec<StatusChoice> {
    let current_key = crate::status::normalize_key(current);
    let mut choices: Vec<StatusChoice> = catalog
        .options()
        .iter()
        .map(|option| StatusChoice {
            key: option.key.clone(),
            label: option.value.clone(),
            enabled: catalog.transition_allowed(current, &option.key)
                && current_key != option.key,
        })
        .collect();
    // The current value stays visible even when the catalog does not
    // carry it, just never selectable.
    if !current_key.is_empty() && !choices.iter().any(|choice| choice.key == current_key) {
        choices.push(StatusChoice {
            key: current_key,
            label: catalog.label(current),
            enabled: false,
        });
    }
    choices
}

/// Compare the row's pre-edit and post-edit status; illegal changes revert
/// to the original value.
pub fn resolve_status_edit(catalog: &StatusCatalog, from: &str, to: &str) -> StatusEdit {
    if catalog.transition_allowed(from, to) {
        StatusEdit::Apply { to: to.to_string() }
    } else {
        StatusEdit::Revert {
            to: from.to_string(),
        }
    }
}
