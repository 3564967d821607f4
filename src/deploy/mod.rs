// ABOUTME: Deploy and rollback orchestration over the work graph.
// ABOUTME: Exports the toolkit entry points, the per-stack state machine, and their options and errors.

mod approval;
mod deployments;
mod error;
mod machine;
mod options;
mod outputs;
mod report;
mod rollback;
mod toolkit;

pub use approval::{Prompter, TerminalPrompter, ask_user_confirmation};
pub use deployments::Deployments;
pub use error::{AssetErrorExt, DeployError, DeployErrorKind};
pub use machine::{DeployState, Iteration, StackDeployment};
pub use options::{DeployOptions, RollbackOptions};
pub use outputs::{OutputsCollector, StackOutputs};
pub use report::{DeployReport, StackResult};
pub use rollback::RollbackCoordinator;
pub use toolkit::Toolkit;
