//! UCI engine session over a long-lived subprocess (async I/O)

use std::future::Future;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use shakmaty::Chess;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use epd_core::notation::position_to_fen;

use crate::error::HarnessError;
use crate::protocol::{SearchReader, SearchResult};

/// Options sent once per session with `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub hash_mb: u32,
    pub threads: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            hash_mb: 1024,
            threads: 3,
        }
    }
}

/// Anything that can run a fixed-time search on a position.
pub trait Searcher {
    fn search(
        &mut self,
        position: &Chess,
        movetime_ms: u32,
    ) -> impl Future<Output = Result<SearchResult, HarnessError>>;
}

/// One engine process, reused for every search in a run.
pub struct EngineSession<W = ChildStdin, R = BufReader<ChildStdout>> {
    process: Option<Child>,
    stdin: Option<W>,
    stdout: R,
    options: Option<EngineOptions>,
}

impl EngineSession {
    /// Spawn the engine with piped stdin/stdout.
    pub fn spawn(path: &Path, args: &[String]) -> Result<Self, HarnessError> {
        let mut process = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| HarnessError::Engine("engine stdin is not piped".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Engine("engine stdout is not piped".into()))?;

        let mut session = Self::from_streams(stdin, BufReader::new(stdout));
        session.process = Some(process);
        Ok(session)
    }
}

impl<W, R> EngineSession<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    /// Session over arbitrary streams, with no process to wait on.
    pub fn from_streams(stdin: W, stdout: R) -> Self {
        Self {
            process: None,
            stdin: Some(stdin),
            stdout,
            options: None,
        }
    }

    /// Send hash size and thread count. Skipped when unchanged.
    pub async fn configure(&mut self, options: EngineOptions) -> Result<(), HarnessError> {
        if self.options == Some(options) {
            return Ok(());
        }
        self.send(&[
            format!("setoption name Hash value {}", options.hash_mb),
            format!("setoption name Threads value {}", options.threads),
        ])
        .await?;
        self.options = Some(options);
        Ok(())
    }

    /// Write a batch of commands as one newline-terminated write.
    async fn send(&mut self, commands: &[String]) -> Result<(), HarnessError> {
        for cmd in commands {
            debug!(cmd = cmd.as_str(), "ENGINE <");
        }
        let mut batch = commands.join("\n");
        batch.push('\n');

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| HarnessError::Engine("command stream already closed".into()))?;
        stdin
            .write_all(batch.as_bytes())
            .await
            .map_err(|e| HarnessError::Engine(format!("Failed to write to engine: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| HarnessError::Engine(format!("Failed to flush engine stdin: {e}")))?;
        Ok(())
    }

    async fn read_result(&mut self) -> Result<SearchResult, HarnessError> {
        let mut reader = SearchReader::new();
        let mut line = String::new();
        while !reader.is_done() {
            line.clear();
            let read = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| HarnessError::Engine(format!("Failed to read from engine: {e}")))?;
            if read == 0 {
                return Err(HarnessError::EngineExited);
            }
            let trimmed = line.trim();
            debug!(line = trimmed, "ENGINE >");
            reader.feed(trimmed);
        }
        reader.finish()
    }

    /// Close the command stream and wait for the engine to exit.
    pub async fn close(mut self) -> Result<Option<ExitStatus>, HarnessError> {
        if let Some(mut stdin) = self.stdin.take() {
            // The engine may already be gone; closing is best effort.
            let _ = stdin.shutdown().await;
        }
        match self.process.take() {
            Some(mut process) => Ok(Some(process.wait().await?)),
            None => Ok(None),
        }
    }
}

impl<W, R> Searcher for EngineSession<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    async fn search(
        &mut self,
        position: &Chess,
        movetime_ms: u32,
    ) -> Result<SearchResult, HarnessError> {
        self.send(&[
            format!("position fen {}", position_to_fen(position)),
            format!("go movetime {movetime_ms}"),
        ])
        .await?;
        self.read_result().await
    }
}

impl<W, R> Drop for EngineSession<W, R> {
    fn drop(&mut self) {
        // Best-effort kill when the session was never closed
        if let Some(process) = self.process.as_mut() {
            let _ = process.start_kill();
        }
    }
}
