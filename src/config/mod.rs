// ABOUTME: Configuration types and parsing for stackhand.yml.
// ABOUTME: Handles YAML parsing, stack loading, and conversion into deploy options.

mod deserialize;
mod init;
mod stack;
mod value;

pub use init::init_config;
pub use stack::StackConfig;
pub use value::{ParameterValue, resolve_parameters};

use deserialize::deserialize_stacks;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assembly::StackArtifact;
use crate::cloud::{DeploymentMethod, HotswapMode, RequireApproval};
use crate::credentials::CredentialSettings;
use crate::deploy::DeployOptions;
use crate::error::{Error, Result};
use crate::graph::Concurrency;

pub const CONFIG_FILENAME: &str = "stackhand.yml";
pub const CONFIG_FILENAME_ALT: &str = "stackhand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stackhand/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: String,

    #[serde(deserialize_with = "deserialize_stacks")]
    pub stacks: NonEmpty<StackConfig>,

    #[serde(default)]
    pub concurrency: Concurrency,

    #[serde(default)]
    pub require_approval: RequireApproval,

    #[serde(default = "default_true")]
    pub rollback: bool,

    #[serde(default)]
    pub force: bool,

    #[serde(default)]
    pub hotswap: HotswapMode,

    #[serde(default)]
    pub method: DeploymentMethod,

    #[serde(default)]
    pub outputs_file: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub prebuild_assets: bool,

    #[serde(default)]
    pub role_arn: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub credentials: CredentialSettings,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find and load the config file in `dir`, returning it with the directory
    /// its template paths resolve against.
    pub fn discover(dir: &Path) -> Result<(Self, PathBuf)> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                // Template paths are relative to the project directory, wherever the file lives.
                return Ok((Self::load(path)?, dir.to_path_buf()));
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Read every stack's template and resolve its parameters.
    pub fn load_stacks(&self, base_dir: &Path) -> Result<Vec<Arc<StackArtifact>>> {
        self.stacks
            .iter()
            .map(|stack| stack.clone().into_artifact(base_dir).map(Arc::new))
            .collect()
    }

    pub fn deploy_options(&self) -> DeployOptions {
        DeployOptions {
            concurrency: self.concurrency,
            require_approval: self.require_approval,
            rollback: self.rollback,
            force: self.force,
            hotswap: self.hotswap,
            method: self.method,
            outputs_file: self.outputs_file.clone(),
            prebuild_assets: self.prebuild_assets,
            role_arn: self.role_arn.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MINIMAL: &str = r#"
app: shop
stacks:
  - name: shop-network
    template: network.template.json
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.app, "shop");
        assert_eq!(config.stacks.len(), 1);
        assert_eq!(config.concurrency, Concurrency::default());
        assert_eq!(config.require_approval, RequireApproval::Broadening);
        assert!(config.rollback);
        assert!(!config.force);
        assert!(config.prebuild_assets);
        assert_eq!(config.credentials.refresh_window, Duration::from_secs(300));
        assert!(config.credentials.role_fallback);

        let stack = config.stacks.first();
        assert!(stack.environment.has_unknown_account());
        assert!(stack.environment.has_unknown_region());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
app: shop
concurrency:
  stacks: 4
  asset_publishes: 2
require_approval: never
rollback: false
hotswap: fall-back
method: direct
outputs_file: out/outputs.json
credentials:
  refresh_window: 10m
  role_fallback: false
stacks:
  - name: shop-api
    environment: aws://123456789012/eu-west-1
    template: api.template.json
    assume_role_arn: "arn:${AWS::Partition}:iam::${AWS::AccountId}:role/deploy"
    dependencies: [shop-network]
    parameters:
      InstanceType: t3.micro
      Secret:
        env: SHOP_SECRET
        default: none
    assets:
      - id: lambda-code
        kind: file
        source: build/api.zip
        destination: assets-bucket/api.zip
  - name: shop-network
    template: network.template.json
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.concurrency.stacks, 4);
        assert_eq!(config.concurrency.asset_builds, 1);
        assert_eq!(config.concurrency.asset_publishes, 2);
        assert_eq!(config.hotswap, HotswapMode::FallBack);
        assert_eq!(config.method, DeploymentMethod::Direct);
        assert_eq!(config.credentials.refresh_window, Duration::from_secs(600));
        assert!(!config.credentials.role_fallback);

        let options = config.deploy_options();
        assert!(!options.rollback);
        assert_eq!(options.require_approval, RequireApproval::Never);
        assert_eq!(
            options.outputs_file.as_deref(),
            Some(Path::new("out/outputs.json"))
        );

        let api = config.stacks.first();
        assert_eq!(api.dependencies.len(), 1);
        assert_eq!(api.assets.len(), 1);
        assert_eq!(api.environment.account, "123456789012");
    }

    #[test]
    fn empty_stack_list_is_rejected() {
        let err = Config::from_yaml("app: shop\nstacks: []\n").unwrap_err();
        assert!(err.to_string().contains("at least one stack is required"));
    }

    #[test]
    fn invalid_stack_name_is_rejected() {
        let yaml = "app: shop\nstacks:\n  - name: 1bad\n    template: t.json\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn load_stacks_reads_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("network.template.json"),
            r#"{"Resources":{"Vpc":{"Type":"AWS::EC2::VPC"}}}"#,
        )
        .unwrap();

        let config = Config::from_yaml(MINIMAL).unwrap();
        let stacks = config.load_stacks(dir.path()).unwrap();

        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].template.resource_count(), 1);
    }

    #[test]
    fn load_stacks_reports_bad_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("network.template.json"), "not json").unwrap();

        let config = Config::from_yaml(MINIMAL).unwrap();
        let err = config.load_stacks(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn discover_finds_config_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();

        let (config, base_dir) = Config::discover(dir.path()).unwrap();
        assert_eq!(config.app, "shop");
        assert_eq!(base_dir, dir.path());
    }

    #[test]
    fn discover_fails_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
    }
}
