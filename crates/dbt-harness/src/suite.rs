//! Test suite file: ordered raw lines, blank lines included.

use std::path::Path;

use crate::error::HarnessError;

#[derive(Debug, Clone, Default)]
pub struct Suite {
    lines: Vec<String>,
}

impl Suite {
    pub async fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Non-blank lines among the first `upto` lines.
    pub fn candidates_before(&self, upto: usize) -> usize {
        self.lines
            .iter()
            .take(upto)
            .filter(|line| !line.trim().is_empty())
            .count()
    }

    /// Non-blank lines, i.e. the lines that may hold a record.
    pub fn candidates(&self) -> usize {
        self.candidates_before(self.lines.len())
    }
}
