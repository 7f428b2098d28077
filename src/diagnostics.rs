// ABOUTME: Diagnostics accumulator for non-fatal warnings during a probe run.
// ABOUTME: Collects warnings that shouldn't fail the run but should be shown to users.

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A leftover resource could not be removed during cleanup.
    pub fn cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Cleanup,
            message: message.into(),
        }
    }

    /// The attempt ledger was unreadable and has been recreated.
    pub fn ledger_recovered(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LedgerRecovered,
            message: message.into(),
        }
    }

    /// A verification request did not return 200.
    pub fn verification_attempt(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::VerificationAttempt,
            message: message.into(),
        }
    }

    /// The final namespace deletion request failed.
    pub fn namespace_delete(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::NamespaceDelete,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Cleanup,
    LedgerRecovered,
    VerificationAttempt,
    NamespaceDelete,
}
