//! Differential difficulty testing for chess engines.
//!
//! Each suite position is searched twice, once freely and once with the
//! claimed best move already played. Positions where the free search does not
//! clearly prefer the claimed move are written to the result file.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod protocol;
pub mod suite;

pub use config::{Cli, HarnessConfig};
pub use driver::{assess, evaluate, run, run_suite, Assessment, RunOptions, RunSummary, Verdict};
pub use engine::{EngineOptions, EngineSession, Searcher};
pub use error::HarnessError;
pub use ledger::Ledger;
pub use protocol::{Score, SearchResult};
pub use suite::Suite;
