// ABOUTME: Synthesized deployment artifacts: stacks, their templates, and the assets they reference.
// ABOUTME: These are the inputs the work graph and the deploy state machine operate on.

mod asset;
mod template;

pub use asset::{AssetKind, AssetManifestEntry};
pub use template::Template;

use std::collections::BTreeMap;

use crate::types::{Environment, StackName};

/// One deployable stack and everything needed to provision it.
#[derive(Debug, Clone)]
pub struct StackArtifact {
    pub name: StackName,
    pub environment: Environment,
    pub template: Template,
    /// Role to assume for write operations against the target account.
    pub assume_role_arn: Option<String>,
    pub assume_role_external_id: Option<String>,
    /// Role to assume for read-only lookups; falls back to `assume_role_arn`.
    pub lookup_role_arn: Option<String>,
    /// Other stacks that must be deployed before this one.
    pub dependencies: Vec<StackName>,
    pub tags: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, String>,
    pub assets: Vec<AssetManifestEntry>,
}

impl StackArtifact {
    /// Minimal artifact with an environment and template; everything else empty.
    pub fn new(name: StackName, environment: Environment, template: Template) -> Self {
        Self {
            name,
            environment,
            template,
            assume_role_arn: None,
            assume_role_external_id: None,
            lookup_role_arn: None,
            dependencies: Vec::new(),
            tags: BTreeMap::new(),
            parameters: BTreeMap::new(),
            assets: Vec::new(),
        }
    }

    pub fn with_asset(mut self, asset: AssetManifestEntry) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn with_dependency(mut self, stack: StackName) -> Self {
        self.dependencies.push(stack);
        self
    }

    pub fn with_assume_role(mut self, role_arn: impl Into<String>) -> Self {
        self.assume_role_arn = Some(role_arn.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_str()
    }

    /// Role used for read-only calls (existence checks, template reads).
    pub fn read_role_arn(&self) -> Option<&str> {
        self.lookup_role_arn
            .as_deref()
            .or(self.assume_role_arn.as_deref())
    }
}
