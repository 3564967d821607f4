// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

use parking_lot::Mutex;
use serde::Serialize;

/// Collects non-fatal warnings during deployment operations.
///
/// Stacks deploy concurrently, so recording only needs a shared reference.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Mutex<Vec<Warning>>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.lock().push(warning);
    }

    /// Snapshot of all collected warnings.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.lock().is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings.into_inner()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Stack has no resources and was never deployed.
    pub fn empty_stack(stack: &str) -> Self {
        Self {
            kind: WarningKind::EmptyStack,
            message: format!("{stack}: stack has no resources, skipping deployment."),
        }
    }

    /// Stack lost all of its resources and is being deleted.
    pub fn destroyed_empty_stack(stack: &str) -> Self {
        Self {
            kind: WarningKind::DestroyedEmptyStack,
            message: format!("{stack}: stack has no resources, deleting existing stack."),
        }
    }

    /// `--force` skipped a confirmation.
    pub fn forced(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ForcedRollback,
            message: message.into(),
        }
    }

    /// A role could not be assumed and base credentials were used instead.
    pub fn role_fallback(stack: &str, role_arn: &str, source: &str) -> Self {
        Self {
            kind: WarningKind::RoleAssumptionFallback,
            message: format!("{stack}: could not assume {role_arn}, proceeding with {source}"),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Stack skipped because its template has no resources.
    EmptyStack,
    /// Previously deployed stack deleted because its template has no resources.
    DestroyedEmptyStack,
    /// Confirmation skipped by `--force`.
    ForcedRollback,
    /// Deployed with base credentials after role assumption failed.
    RoleAssumptionFallback,
}
