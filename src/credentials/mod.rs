// ABOUTME: Credential resolution and caching.
// ABOUTME: Picks ambient, plugin, or assumed-role credentials per target account and mode.

mod assume;
mod base;
mod broker;
mod cache;
mod environment;
mod error;
mod plugin;
mod provider;
mod types;

pub use assume::{RoleAssumptionEngine, RoleOptions, RoleSession, session_name};
pub use base::BaseCredentialResolver;
pub use broker::{CredentialBroker, CredentialSettings};
pub use cache::{DefaultAccount, DefaultAccountCache, SingleFlightCache};
pub use environment::EnvironmentResolver;
pub use error::{AuthError, AuthErrorKind, obtain_credentials_message};
pub use plugin::{CredentialSource, PluginCredentialResolver, PluginCredentials, PluginMatch};
pub use provider::{
    CachingProvider, CredentialProvider, LegacyCredentials, LegacyProvider, RefetchingProvider,
    SharedProvider, StaticProvider,
};
pub use types::{CredentialOutcome, Credentials, Mode};
