// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Enforces a non-empty stack list.

use nonempty::NonEmpty;
use serde::Deserialize;

use super::StackConfig;

pub fn deserialize_stacks<'de, D>(deserializer: D) -> Result<NonEmpty<StackConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let stacks: Vec<StackConfig> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(stacks)
        .ok_or_else(|| serde::de::Error::custom("at least one stack is required"))
}
