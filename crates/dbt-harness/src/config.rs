//! Harness configuration from the command line and environment variables

use std::path::{Path, PathBuf};

use clap::Parser;
use epd_core::ParserOptions;

use crate::engine::EngineOptions;
use crate::error::HarnessError;

#[derive(Parser, Debug)]
#[command(
    name = "dbt",
    about = "Run a differential difficulty test on an EPD test suite"
)]
pub struct Cli {
    /// Path to the chess engine
    pub engine: PathBuf,

    /// Path to the EPD test suite
    pub testsuite: PathBuf,

    /// Search time per position in milliseconds
    pub movetime: u32,

    /// Number of engine threads
    #[arg(long, env = "DBT_THREADS", default_value_t = 3)]
    pub threads: u32,

    /// Engine hash table size in MB
    #[arg(long, env = "DBT_HASH", default_value_t = 1024)]
    pub hash: u32,

    /// Continue an interrupted run after the last line already in the result file
    #[arg(long)]
    pub resume: bool,

    /// Result file (default: <testsuite>_<seconds>sec.epd)
    #[arg(long, short, env = "DBT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Extra argument passed to the engine process (repeatable)
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Only accept SAN move annotations
    #[arg(long)]
    pub no_coordinate_moves: bool,

    /// Write the run summary as JSON to this path
    #[arg(long, env = "DBT_SUMMARY")]
    pub summary: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub engine_path: PathBuf,
    pub engine_args: Vec<String>,
    pub suite_path: PathBuf,
    pub result_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub movetime_ms: u32,
    pub engine: EngineOptions,
    pub resume: bool,
    pub parser: ParserOptions,
}

impl HarnessConfig {
    /// Defaults for everything but the engine, suite and search time.
    pub fn new(engine_path: &Path, suite_path: &Path, movetime_ms: u32) -> Self {
        Self {
            engine_path: engine_path.to_path_buf(),
            engine_args: Vec::new(),
            suite_path: suite_path.to_path_buf(),
            result_path: default_result_path(suite_path, movetime_ms),
            summary_path: None,
            movetime_ms,
            engine: EngineOptions::default(),
            resume: false,
            parser: ParserOptions::default(),
        }
    }

    pub fn from_cli(cli: Cli) -> Self {
        let mut config = Self::new(&cli.engine, &cli.testsuite, cli.movetime);
        if let Some(output) = cli.output {
            config.result_path = output;
        }
        config.engine_args = cli.engine_args;
        config.summary_path = cli.summary;
        config.engine = EngineOptions {
            hash_mb: cli.hash,
            threads: cli.threads,
        };
        config.resume = cli.resume;
        config.parser.coordinate_moves = !cli.no_coordinate_moves;
        config
    }

    /// Checks that must pass before any file is written or process started.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if !self.engine_path.is_file() {
            return Err(HarnessError::Config(format!(
                "Engine {} not found",
                self.engine_path.display()
            )));
        }
        if !self.suite_path.is_file() {
            return Err(HarnessError::Config(format!(
                "Testsuite {} not found",
                self.suite_path.display()
            )));
        }
        if self.movetime_ms == 0 {
            return Err(HarnessError::Config("movetime must be positive".into()));
        }
        if self.engine.threads == 0 {
            return Err(HarnessError::Config("threads must be positive".into()));
        }
        if self.result_path == self.suite_path {
            return Err(HarnessError::Config(
                "result file would overwrite the testsuite".into(),
            ));
        }
        Ok(())
    }
}

/// `hard.epd` searched for 2000 ms becomes `hard_2.0sec.epd`.
pub fn default_result_path(suite_path: &Path, movetime_ms: u32) -> PathBuf {
    let suite = suite_path.to_string_lossy();
    let stem = suite.split(".epd").next().unwrap_or(&suite);
    let seconds = f64::from(movetime_ms) / 1000.0;
    PathBuf::from(format!("{stem}_{seconds:?}sec.epd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_path() {
        assert_eq!(
            default_result_path(Path::new("suites/hard.epd"), 2000),
            PathBuf::from("suites/hard_2.0sec.epd")
        );
        assert_eq!(
            default_result_path(Path::new("wac"), 1250),
            PathBuf::from("wac_1.25sec.epd")
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["dbt", "/bin/engine", "suite.epd", "500"]).unwrap();
        let config = HarnessConfig::from_cli(cli);
        assert_eq!(config.movetime_ms, 500);
        assert_eq!(config.engine, EngineOptions::default());
        assert!(!config.resume);
        assert!(config.parser.coordinate_moves);
        assert_eq!(config.result_path, PathBuf::from("suite_0.5sec.epd"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "dbt",
            "/bin/sh",
            "suite.epd",
            "100",
            "--threads",
            "1",
            "--hash",
            "16",
            "--resume",
            "--output",
            "out.epd",
            "--engine-arg",
            "-c",
            "--no-coordinate-moves",
        ])
        .unwrap();
        let config = HarnessConfig::from_cli(cli);
        assert_eq!(
            config.engine,
            EngineOptions {
                hash_mb: 16,
                threads: 1
            }
        );
        assert!(config.resume);
        assert_eq!(config.result_path, PathBuf::from("out.epd"));
        assert_eq!(config.engine_args, vec!["-c".to_string()]);
        assert!(!config.parser.coordinate_moves);
    }

    #[test]
    fn test_validate_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let suite = dir.path().join("suite.epd");
        let config = HarnessConfig::new(Path::new("/no/such/engine"), &suite, 100);
        assert!(matches!(config.validate(), Err(HarnessError::Config(_))));

        std::fs::write(&suite, "\n").unwrap();
        let engine = dir.path().join("engine");
        std::fs::write(&engine, "").unwrap();
        let config = HarnessConfig::new(&engine, &suite, 100);
        assert!(config.validate().is_ok());

        let mut zero = config.clone();
        zero.movetime_ms = 0;
        assert!(matches!(zero.validate(), Err(HarnessError::Config(_))));
    }
}
