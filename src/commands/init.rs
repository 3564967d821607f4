// ABOUTME: Init command implementation.
// ABOUTME: Writes a starter stackhand.yml into the current directory.

use stackhand::config::{self, CONFIG_FILENAME};
use stackhand::error::Result;
use stackhand::output::Output;
use std::env;

pub fn init(app: Option<&str>, force: bool, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    config::init_config(&cwd, app, force)?;
    output.success(&format!("Created {CONFIG_FILENAME}"));
    Ok(())
}
