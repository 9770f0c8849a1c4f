//! Line-aligned result file.
//!
//! Line N of the ledger answers for line N of the suite: blank, or the suite
//! line itself when the position was judged hard. The number of complete
//! lines already present is the resume cursor.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::HarnessError;

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    lines: usize,
}

impl Ledger {
    /// Start an empty ledger, discarding any previous content.
    pub async fn create(path: &Path) -> Result<Self, HarnessError> {
        fs::write(path, b"").await?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: 0,
        })
    }

    /// Reuse an existing ledger, or start an empty one if there is none.
    ///
    /// A trailing line without its newline is cut off so the cursor counts
    /// only complete lines.
    pub async fn resume(path: &Path) -> Result<Self, HarnessError> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::create(path).await,
            Err(e) => return Err(e.into()),
        };

        let complete = content
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        if complete < content.len() {
            warn!(
                path = %path.display(),
                dropped_bytes = content.len() - complete,
                "Truncating partial trailing line"
            );
            let file = OpenOptions::new().write(true).open(path).await?;
            file.set_len(complete as u64).await?;
        }

        let lines = content[..complete].iter().filter(|&&b| b == b'\n').count();
        info!(path = %path.display(), lines, "Resuming from existing ledger");
        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    pub async fn open(path: &Path, resume: bool) -> Result<Self, HarnessError> {
        if resume {
            Self::resume(path).await
        } else {
            Self::create(path).await
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of suite lines already answered.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub async fn append_blank(&mut self) -> Result<(), HarnessError> {
        self.append("").await
    }

    pub async fn append_hard(&mut self, raw: &str) -> Result<(), HarnessError> {
        self.append(raw).await
    }

    /// Open, append one full line, flush and close.
    async fn append(&mut self, line: &str) -> Result<(), HarnessError> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await?;
        self.lines += 1;
        Ok(())
    }
}
