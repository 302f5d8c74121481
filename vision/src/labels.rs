use std::fs;
use std::path::Path;

use anyhow::{ensure, Context};
use tch::vision::imagenet;

/// Class index to human readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels(Vec<String>);

impl Labels {
    /// The 1000 ImageNet classes, in model output order.
    pub fn imagenet() -> Self {
        Self(imagenet::CLASSES.iter().map(|s| (*s).to_owned()).collect())
    }

    /// Reads one label per line, blank lines are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Reading labels from {}", path.display()))?;
        let labels = Self::from_lines(&content);
        ensure!(!labels.is_empty(), "No labels in {}", path.display());
        Ok(labels)
    }

    pub fn from_lines(content: &str) -> Self {
        Self(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        )
    }

    pub fn get(&self, class: usize) -> Option<&str> {
        self.0.get(class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
