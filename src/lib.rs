// ABOUTME: Library root for stackhand - credential resolution and deploy orchestration.
// ABOUTME: The CLI binary is in main.rs.

pub mod assembly;
pub mod cloud;
pub mod config;
pub mod credentials;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod output;
pub mod types;
