// ABOUTME: Plan command implementation.
// ABOUTME: Loads the config, builds the work graph, and prints it wave by wave.

use stackhand::config::Config;
use stackhand::error::Result;
use stackhand::graph::WorkGraph;
use stackhand::output::Output;
use std::env;

pub fn plan(output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let (config, base_dir) = Config::discover(&cwd)?;
    let stacks = config.load_stacks(&base_dir)?;

    for stack in &stacks {
        if stack.template.is_empty() {
            output.warning(&format!(
                "{}: stack has no resources and will be skipped or deleted",
                stack.display_name()
            ));
        }
    }

    let graph = WorkGraph::build(&stacks, config.prebuild_assets)?;
    let waves = graph.waves()?;

    output.progress(&format!(
        "{}: {} stack(s), {} node(s)",
        config.app,
        stacks.len(),
        graph.len()
    ));
    for (index, wave) in waves.iter().enumerate() {
        let nodes: Vec<String> = wave.iter().map(ToString::to_string).collect();
        output.wave(index + 1, &nodes);
    }
    output.success(&format!("{} wave(s)", waves.len()));

    Ok(())
}
