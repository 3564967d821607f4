// ABOUTME: What a deploy run produced: per-stack results, outputs, and warnings.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::diagnostics::Warning;
use crate::types::StackName;

use super::StackOutputs;

/// How a single stack finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum StackResult {
    Deployed {
        stack_arn: String,
        /// The provisioning service found nothing to change.
        no_op: bool,
        outputs: BTreeMap<String, String>,
    },
    /// No resources and never deployed.
    Skipped,
    /// No resources left, so the deployed stack was deleted.
    Destroyed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployReport {
    pub results: BTreeMap<StackName, StackResult>,
    pub outputs: StackOutputs,
    pub warnings: Vec<Warning>,
}

impl DeployReport {
    pub fn result(&self, stack: &StackName) -> Option<&StackResult> {
        self.results.get(stack)
    }

    pub fn deployed_count(&self) -> usize {
        self.results
            .values()
            .filter(|r| matches!(r, StackResult::Deployed { .. }))
            .count()
    }
}
