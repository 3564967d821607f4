// ABOUTME: Target environment (account + region) of a stack.
// ABOUTME: Parses aws://ACCOUNT/REGION and recognizes the unresolved sentinels.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Placeholder account used until the ambient account has been looked up.
pub const UNKNOWN_ACCOUNT: &str = "unknown-account";

/// Placeholder region used until the process default region is substituted.
pub const UNKNOWN_REGION: &str = "unknown-region";

const SCHEME: &str = "aws://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEnvironmentError {
    #[error("environment cannot be empty")]
    Empty,

    #[error("environment must start with '{SCHEME}': {0}")]
    MissingScheme(String),

    #[error("environment must have the form aws://ACCOUNT/REGION: {0}")]
    InvalidFormat(String),
}

/// Account and region a stack deploys into.
///
/// Either half may be a sentinel (`unknown-account`, `unknown-region`) until
/// the environment resolver substitutes the ambient defaults.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment {
    pub account: String,
    pub region: String,
    pub name: String,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        let account = account.into();
        let region = region.into();
        let name = format!("{SCHEME}{account}/{region}");
        Self {
            account,
            region,
            name,
        }
    }

    /// An environment that defers both account and region to the ambient defaults.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ACCOUNT, UNKNOWN_REGION)
    }

    pub fn parse(input: &str) -> Result<Self, ParseEnvironmentError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseEnvironmentError::Empty);
        }

        let rest = input
            .strip_prefix(SCHEME)
            .ok_or_else(|| ParseEnvironmentError::MissingScheme(input.to_string()))?;

        match rest.split_once('/') {
            Some((account, region))
                if !account.is_empty() && !region.is_empty() && !region.contains('/') =>
            {
                Ok(Self::new(account, region))
            }
            _ => Err(ParseEnvironmentError::InvalidFormat(input.to_string())),
        }
    }

    pub fn has_unknown_account(&self) -> bool {
        self.account == UNKNOWN_ACCOUNT
    }

    pub fn has_unknown_region(&self) -> bool {
        self.region == UNKNOWN_REGION
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Environment::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_account_and_region() {
        let env = Environment::parse("aws://123456789012/eu-west-1").unwrap();
        assert_eq!(env.account, "123456789012");
        assert_eq!(env.region, "eu-west-1");
        assert_eq!(env.name, "aws://123456789012/eu-west-1");
    }

    #[test]
    fn recognizes_sentinels() {
        let env = Environment::parse("aws://unknown-account/unknown-region").unwrap();
        assert!(env.has_unknown_account());
        assert!(env.has_unknown_region());
        assert_eq!(env, Environment::unknown());
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(matches!(
            Environment::parse("123456789012/eu-west-1"),
            Err(ParseEnvironmentError::MissingScheme(_))
        ));
    }

    #[test]
    fn rejects_missing_region() {
        assert!(matches!(
            Environment::parse("aws://123456789012/"),
            Err(ParseEnvironmentError::InvalidFormat(_))
        ));
        assert!(matches!(
            Environment::parse("aws://123456789012"),
            Err(ParseEnvironmentError::InvalidFormat(_))
        ));
    }
}
