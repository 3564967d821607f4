// ABOUTME: Command implementations for the CLI.
// ABOUTME: Each command is in its own module for maintainability.

mod init;
mod plan;

pub use init::init;
pub use plan::plan;
