// ABOUTME: Per-stack configuration entries.
// ABOUTME: Turned into stack artifacts by reading the template file next to the config.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::assembly::{AssetManifestEntry, StackArtifact, Template};
use crate::error::{Error, Result};
use crate::types::{Environment, StackName};

use super::value::{ParameterValue, resolve_parameters};

#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    pub name: StackName,

    #[serde(default)]
    pub environment: Environment,

    /// JSON template, relative to the config file's directory.
    pub template: PathBuf,

    #[serde(default)]
    pub assume_role_arn: Option<String>,

    #[serde(default)]
    pub assume_role_external_id: Option<String>,

    #[serde(default)]
    pub lookup_role_arn: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<StackName>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,

    #[serde(default)]
    pub assets: Vec<AssetManifestEntry>,
}

impl StackConfig {
    pub fn into_artifact(self, base_dir: &Path) -> Result<StackArtifact> {
        let path = base_dir.join(&self.template);
        let content = std::fs::read_to_string(&path)?;
        let template =
            Template::from_json(&content).map_err(|source| Error::Template { path, source })?;

        Ok(StackArtifact {
            parameters: resolve_parameters(&self.parameters)?,
            name: self.name,
            environment: self.environment,
            template,
            assume_role_arn: self.assume_role_arn,
            assume_role_external_id: self.assume_role_external_id,
            lookup_role_arn: self.lookup_role_arn,
            dependencies: self.dependencies,
            tags: self.tags,
            assets: self.assets,
        })
    }
}
