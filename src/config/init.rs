// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a starter stackhand.yml and an empty template next to it.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const TEMPLATE_FILENAME: &str = "main.template.json";
const STARTER_TEMPLATE: &str = "{\n  \"Resources\": {}\n}\n";

pub fn init_config(dir: &Path, app: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let app = app.unwrap_or("my-app");
    let stack = format!("{app}-main");
    crate::types::StackName::new(&stack).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    std::fs::write(&config_path, generate_template_yaml(app, &stack))?;

    let template_path = dir.join(TEMPLATE_FILENAME);
    if !template_path.exists() {
        std::fs::write(&template_path, STARTER_TEMPLATE)?;
    }

    Ok(())
}

fn generate_template_yaml(app: &str, stack: &str) -> String {
    format!(
        r#"app: {app}
stacks:
  - name: {stack}
    # aws://ACCOUNT/REGION; unknown-account/unknown-region use the ambient defaults
    environment: aws://unknown-account/unknown-region
    template: {TEMPLATE_FILENAME}
concurrency:
  stacks: 1
  asset_builds: 1
  asset_publishes: 8
require_approval: broadening
credentials:
  refresh_window: 5m
  role_fallback: true
"#
    )
}
