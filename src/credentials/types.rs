// ABOUTME: Credential values, lookup modes, and the tagged outcome of a base-credential lookup.
// ABOUTME: Only CorrectDefault and Plugin outcomes carry credentials usable for the target account.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

use crate::types::AccountId;

use super::SharedProvider;

/// A set of temporary or long-lived access keys.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expiration: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// True when the credentials expire within `window` from now.
    /// Credentials without an expiration never expire.
    pub fn expires_within(&self, window: Duration) -> bool {
        let Some(expiration) = self.expiration else {
            return false;
        };
        let Ok(window) = chrono::Duration::from_std(window) else {
            return true;
        };
        match Utc::now().checked_add_signed(window) {
            Some(deadline) => deadline >= expiration,
            None => true,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// What the credentials will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    ForReading,
    ForWriting,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::ForReading => f.write_str("read"),
            Mode::ForWriting => f.write_str("write"),
        }
    }
}

/// Result of deciding which credential source serves a target account.
#[derive(Clone)]
pub enum CredentialOutcome {
    /// The ambient credentials already belong to the target account.
    CorrectDefault { credentials: SharedProvider },
    /// A credential plugin supplied credentials for the target account.
    Plugin {
        credentials: SharedProvider,
        plugin_name: String,
    },
    /// Ambient credentials exist but belong to `account_id`, and no plugin matched.
    IncorrectDefault {
        credentials: SharedProvider,
        account_id: AccountId,
        unused_plugins: Vec<String>,
    },
    /// Neither ambient credentials nor a plugin are available.
    NoCredentials { unused_plugins: Vec<String> },
}

impl CredentialOutcome {
    /// Credentials known to be valid for the target account.
    pub fn usable_credentials(&self) -> Option<&SharedProvider> {
        match self {
            CredentialOutcome::CorrectDefault { credentials }
            | CredentialOutcome::Plugin { credentials, .. } => Some(credentials),
            CredentialOutcome::IncorrectDefault { .. } | CredentialOutcome::NoCredentials { .. } => {
                None
            }
        }
    }

    /// Any credentials at all, including ambient ones for the wrong account.
    pub fn any_credentials(&self) -> Option<&SharedProvider> {
        match self {
            CredentialOutcome::CorrectDefault { credentials }
            | CredentialOutcome::Plugin { credentials, .. }
            | CredentialOutcome::IncorrectDefault { credentials, .. } => Some(credentials),
            CredentialOutcome::NoCredentials { .. } => None,
        }
    }

    /// Short description of where the credentials came from.
    pub fn source_description(&self) -> String {
        match self {
            CredentialOutcome::CorrectDefault { .. } => "current credentials".to_string(),
            CredentialOutcome::Plugin { plugin_name, .. } => format!("plugin {plugin_name}"),
            CredentialOutcome::IncorrectDefault { .. } => "current credentials".to_string(),
            CredentialOutcome::NoCredentials { .. } => "no credentials".to_string(),
        }
    }
}

impl fmt::Debug for CredentialOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialOutcome::CorrectDefault { .. } => f.write_str("CorrectDefault"),
            CredentialOutcome::Plugin { plugin_name, .. } => f
                .debug_struct("Plugin")
                .field("plugin_name", plugin_name)
                .finish_non_exhaustive(),
            CredentialOutcome::IncorrectDefault {
                account_id,
                unused_plugins,
                ..
            } => f
                .debug_struct("IncorrectDefault")
                .field("account_id", account_id)
                .field("unused_plugins", unused_plugins)
                .finish_non_exhaustive(),
            CredentialOutcome::NoCredentials { unused_plugins } => f
                .debug_struct("NoCredentials")
                .field("unused_plugins", unused_plugins)
                .finish(),
        }
    }
}
