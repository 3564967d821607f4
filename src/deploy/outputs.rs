// ABOUTME: Accumulates stack outputs across a run and writes them to the outputs file.
// ABOUTME: Only stacks that report at least one output get an entry.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;

use super::DeployError;

pub type StackOutputs = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Default)]
pub struct OutputsCollector {
    outputs: Mutex<StackOutputs>,
}

impl OutputsCollector {
    /// Record `outputs` for `stack`; empty maps are ignored.
    pub fn record(&self, stack: &str, outputs: &BTreeMap<String, String>) {
        if outputs.is_empty() {
            return;
        }
        self.outputs
            .lock()
            .insert(stack.to_string(), outputs.clone());
    }

    pub fn snapshot(&self) -> StackOutputs {
        self.outputs.lock().clone()
    }

    pub fn into_outputs(self) -> StackOutputs {
        self.outputs.into_inner()
    }

    /// Write everything collected so far as pretty JSON, creating parent directories.
    pub async fn write(&self, path: &Path) -> Result<(), DeployError> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        let io_error = |source| DeployError::OutputsFile {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(path, json).await.map_err(io_error)?;

        tracing::debug!("Wrote stack outputs to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_outputs_are_not_recorded() {
        let collector = OutputsCollector::default();
        collector.record("empty", &BTreeMap::new());
        collector.record("app", &outputs(&[("Url", "https://example.com")]));

        let all = collector.into_outputs();
        assert_eq!(all.len(), 1);
        assert_eq!(all["app"]["Url"], "https://example.com");
    }

    #[tokio::test]
    async fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("outputs.json");

        let collector = OutputsCollector::default();
        collector.record("app", &outputs(&[("Bucket", "my-bucket")]));
        collector.write(&path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["app"]["Bucket"], "my-bucket");
        assert!(written.contains('\n'));
    }
}
