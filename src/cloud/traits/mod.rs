// ABOUTME: Capability traits for the external collaborators the orchestrator drives.
// ABOUTME: Defines IdentityOps, StackOps, AssetOps, and TemplateDiff.

mod assets;
mod diff;
mod identity;
mod stacks;

pub use assets::AssetOps;
pub use diff::TemplateDiff;
pub use identity::IdentityOps;
pub use stacks::StackOps;
