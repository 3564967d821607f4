// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod environment;
mod id;
mod stack_name;

pub use environment::{Environment, ParseEnvironmentError, UNKNOWN_ACCOUNT, UNKNOWN_REGION};
pub use id::{AccountId, AssetId, Id};
pub use stack_name::{StackName, StackNameError};
