// src/status.rs

use serde::{Deserialize, Serialize};

/* ============================================================
   Status keys and escalation levels

   Levels: 1 open, 2 in-progress/confirmed, 3 terminal.
   Unknown keys classify as level 1 (lenient classifier, not a
   validator): a backend introducing new low-risk statuses never
   gets misclassified as locked.
   ============================================================ */

const STATUS_LEVELS: &[(&str, u8)] = &[
    ("new", 1),
    ("waiting", 1),
    ("confirmed", 2),
    ("patient_confirmed", 2),
    ("rescheduled", 2),
    ("canceled", 3),
    ("cancelled", 3),
    ("completed", 3),
    ("no_show", 3),
];

pub const FINAL_LEVEL: u8 = 3;

/// Lowercase, trim, collapse whitespace/hyphen runs to a single underscore.
/// Total: empty input yields an empty key.
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_sep = !key.is_empty();
            continue;
        }
        if pending_sep {
            key.push('_');
            pending_sep = false;
        }
        for lower in ch.to_lowercase() {
            key.push(lower);
        }
    }
    key
}

fn builtin_level(key: &str) -> Option<u8> {
    STATUS_LEVELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, level)| *level)
}

pub fn level(raw: &str) -> u8 {
    builtin_level(&normalize_key(raw)).unwrap_or(1)
}

pub fn is_final(raw: &str) -> bool {
    level(raw) >= FINAL_LEVEL
}

/// Transition gate:
/// - identical normalized keys (or an empty `from`) are always allowed;
/// - a final `from` permits nothing;
/// - level 2 may only advance to a final status;
/// - level 1 may go anywhere.
pub fn transition_allowed(from: &str, to: &str) -> bool {
    let from_key = normalize_key(from);
    let to_key = normalize_key(to);
    if from_key.is_empty() || from_key == to_key {
        return true;
    }
    if is_final(from) {
        return false;
    }
    if level(from) >= 2 {
        return is_final(to);
    }
    true
}

/// Title-cased rendering with underscores/hyphens as spaces.
/// Empty or missing input renders as "-".
pub fn label(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "-".to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut at_word_start = true;
    let mut pending_space = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_space = !out.is_empty();
            at_word_start = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if at_word_start {
            for upper in ch.to_uppercase() {
                out.push(upper);
            }
            at_word_start = false;
        } else {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        }
    }
    out
}

/* ============================================================
   Status option catalog
   ============================================================ */

/// One entry of the backend status catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusOption {
    pub key: String,
    pub value: String,
    pub level: u8,
    pub is_final: bool,
}

/// Backend catalog merged with the built-in table.
///
/// The catalog is authoritative for keys the built-in table does not know,
/// but it can never lower a built-in level: the effective level is the max
/// of both sources, so a misconfigured backend cannot unlock editing of a
/// completed appointment.
#[derive(Debug, Clone, Default)]
pub struct StatusCatalog {
    options: Vec<StatusOption>,
}

impl StatusCatalog {
    pub fn new(options: Vec<StatusOption>) -> Self {
        let options = options
            .into_iter()
            .map(|mut opt| {
                opt.key = normalize_key(&opt.key);
                opt
            })
            .filter(|opt| !opt.key.is_empty())
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &[StatusOption] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn catalog_level(&self, key: &str) -> Option<u8> {
        self.options.iter().find(|opt| opt.key == key).map(|opt| {
            if opt.is_final {
                opt.level.max(FINAL_LEVEL)
            } else {
                opt.level
            }
        })
    }

    pub fn level(&self, raw: &str) -> u8 {
        let key = normalize_key(raw);
        let builtin = builtin_level(&key);
        match (self.catalog_level(&key), builtin) {
            (Some(cat), Some(builtin)) => cat.max(builtin),
            (Some(cat), None) => cat,
            (None, Some(builtin)) => builtin,
            (None, None) => 1,
        }
    }

    pub fn is_final(&self, raw: &str) -> bool {
        self.level(raw) >= FINAL_LEVEL
    }

    pub fn transition_allowed(&self, from: &str, to: &str) -> bool {
        let from_key = normalize_key(from);
        let to_key = normalize_key(to);
        if from_key.is_empty() || from_key == to_key {
            return true;
        }
        if self.is_final(from) {
            return false;
        }
        if self.level(from) >= 2 {
            return self.is_final(to);
        }
        true
    }

    /// Display label for a key: catalog value when present, derived otherwise.
    pub fn label(&self, raw: &str) -> String {
        let key = normalize_key(raw);
        self.options
            .iter()
            .find(|opt| opt.key == key)
            .map(|opt| opt.value.clone())
            .unwrap_or_else(|| label(raw))
    }
}
