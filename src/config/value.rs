// ABOUTME: Stack parameter values from the config file.
// ABOUTME: Scalars are passed as strings; `env:` entries are read from the process environment at load time.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One stack parameter as written in `stackhand.yml`.
///
/// ```yaml
/// parameters:
///   InstanceType: t3.micro
///   DesiredCount: 3
///   ImageTag: { env: IMAGE_TAG, default: latest }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Text(String),
    Number(serde_yaml::Number),
    Flag(bool),
    FromEnv {
        env: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl ParameterValue {
    /// The string passed to the provisioning call. `lookup` reads a variable.
    pub fn resolve_with(
        &self,
        name: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String> {
        match self {
            ParameterValue::Text(text) => Ok(text.clone()),
            ParameterValue::Number(number) => Ok(number.to_string()),
            ParameterValue::Flag(flag) => Ok(flag.to_string()),
            ParameterValue::FromEnv { env, default } => lookup(env)
                .or_else(|| default.clone())
                .ok_or_else(|| Error::UnresolvedParameter {
                    parameter: name.to_string(),
                    var: env.clone(),
                }),
        }
    }
}

/// Resolve every parameter against the process environment.
pub fn resolve_parameters(
    parameters: &BTreeMap<String, ParameterValue>,
) -> Result<BTreeMap<String, String>> {
    parameters
        .iter()
        .map(|(name, value)| {
            let resolved = value.resolve_with(name, |var| std::env::var(var).ok())?;
            Ok((name.clone(), resolved))
        })
        .collect()
}
