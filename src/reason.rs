// src/reason.rs

/// Gate in front of actions that require a short free-text justification
/// (editing an existing appointment, cancelling one). The pending action is
/// held until a non-empty reason is confirmed; cancelling discards it.
#[derive(Debug, Default)]
pub struct ReasonGate<A> {
    pending: Option<A>,
    reason: String,
}

impl<A> ReasonGate<A> {
    pub fn new() -> Self {
        Self {
            pending: None,
            reason: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&A> {
        self.pending.as_ref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, text: impl Into<String>) {
        self.reason = text.into();
    }

    pub fn is_reason_valid(&self) -> bool {
        !self.reason.trim().is_empty()
    }

    /// Capture an action and start the reason prompt. Refused (returns
    /// false) while another action is already pending; any stale reason
    /// text is cleared.
    pub fn open(&mut self, action: A) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(action);
        self.reason.clear();
        true
    }

    /// Confirm the pending action. Yields the action with the trimmed
    /// reason and resets the gate; `None` when nothing is pending or the
    /// reason is empty after trimming (the gate stays open).
    pub fn confirm(&mut self) -> Option<(A, String)> {
        let reason = self.reason.trim().to_string();
        if reason.is_empty() || self.pending.is_none() {
            return None;
        }
        let action = self.pending.take()?;
        self.reason.clear();
        Some((action, reason))
    }

    /// Discard the pending action, returning it so the caller can restore
    /// UI state.
    pub fn cancel(&mut self) -> Option<A> {
        self.reason.clear();
        self.pending.take()
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.reason.clear();
    }
}
