//! Two-phase classification and the resumable suite run.

use std::path::Path;

use epd_core::notation::uci_to_san;
use epd_core::{ParserOptions, Record};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::HarnessConfig;
use crate::engine::{EngineSession, Searcher};
use crate::error::HarnessError;
use crate::ledger::Ledger;
use crate::protocol::Score;
use crate::suite::Suite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NotHard,
    Hard,
}

/// How a record was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// The free search already plays the expected move.
    AlreadySolved,
    /// One of the two searches reported a mate score.
    MateScore,
    /// Both searches reported centipawns; `forced` is from the opponent's
    /// point of view after the expected move.
    Compared { baseline: i32, forced: i32 },
}

impl Assessment {
    pub fn from_scores(baseline: Score, forced: Score) -> Self {
        match (baseline, forced) {
            (Score::Centipawns(baseline), Score::Centipawns(forced)) => {
                Assessment::Compared { baseline, forced }
            }
            _ => Assessment::MateScore,
        }
    }

    /// Hard when the free line scores at least as well as the forced line,
    /// with the forced score negated back to the original side to move.
    pub fn verdict(&self) -> Verdict {
        match *self {
            Assessment::Compared { baseline, forced }
                if i64::from(baseline) >= -i64::from(forced) =>
            {
                Verdict::Hard
            }
            _ => Verdict::NotHard,
        }
    }

    fn searches(&self) -> u64 {
        match self {
            Assessment::AlreadySolved => 1,
            _ => 2,
        }
    }
}

/// Search the record's position freely, then with the expected move played.
pub async fn assess<S: Searcher>(
    record: &Record,
    movetime_ms: u32,
    searcher: &mut S,
) -> Result<Assessment, HarnessError> {
    let baseline = searcher.search(&record.position, movetime_ms).await?;
    let baseline_san = uci_to_san(&record.position, &baseline.best_move);
    match &baseline_san {
        Some(san) => info!(best_move = %san, score = %baseline.score, "Warm-up search"),
        None => warn!(
            best_move = %baseline.best_move,
            "Engine best move is not legal in the searched position"
        ),
    }

    if baseline_san.as_deref() == Some(record.expected_move.as_str()) {
        info!("Best move already found");
        return Ok(Assessment::AlreadySolved);
    }

    let forced_position = record.position_after_expected().ok_or_else(|| {
        HarnessError::Position(format!(
            "cannot play {} in {}",
            record.expected_move,
            record.fen()
        ))
    })?;
    let forced = searcher.search(&forced_position, movetime_ms).await?;
    info!(forced_move = %record.expected_move, score = %forced.score, "Forced search");

    Ok(Assessment::from_scores(baseline.score, forced.score))
}

/// Hard/not-hard decision for one record.
pub async fn evaluate<S: Searcher>(
    record: &Record,
    movetime_ms: u32,
    searcher: &mut S,
) -> Result<Verdict, HarnessError> {
    Ok(assess(record, movetime_ms, searcher).await?.verdict())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub movetime_ms: u32,
    pub parser: ParserOptions,
}

/// Per-run counters. `skipped` lines were already in the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub suite_lines: usize,
    pub skipped: usize,
    pub blank: usize,
    pub unannotated: usize,
    pub parse_failures: usize,
    pub solved: usize,
    pub mate_scores: usize,
    pub hard: usize,
    pub not_hard: usize,
    pub searches: u64,
}

impl RunSummary {
    /// Ledger lines written during this run.
    pub fn written(&self) -> usize {
        self.blank
            + self.unannotated
            + self.parse_failures
            + self.solved
            + self.mate_scores
            + self.hard
            + self.not_hard
    }

    /// Lines preserved in the ledger by this run, for human review or as hard positions.
    pub fn flagged(&self) -> usize {
        self.hard + self.parse_failures
    }

    fn tally(&mut self, assessment: &Assessment) {
        self.searches += assessment.searches();
        match assessment {
            Assessment::AlreadySolved => self.solved += 1,
            Assessment::MateScore => self.mate_scores += 1,
            Assessment::Compared { .. } => match assessment.verdict() {
                Verdict::Hard => self.hard += 1,
                Verdict::NotHard => self.not_hard += 1,
            },
        }
    }

    pub async fn write_json(&self, path: &Path) -> Result<(), HarnessError> {
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Answer every suite line not yet in the ledger, one ledger line each.
pub async fn run_suite<S: Searcher>(
    suite: &Suite,
    ledger: &mut Ledger,
    searcher: &mut S,
    options: &RunOptions,
) -> Result<RunSummary, HarnessError> {
    let mut summary = RunSummary {
        suite_lines: suite.len(),
        skipped: ledger.lines(),
        ..RunSummary::default()
    };

    let start = ledger.lines();
    if start > suite.len() {
        warn!(
            ledger_lines = start,
            suite_lines = suite.len(),
            "Ledger is longer than the testsuite, nothing to do"
        );
        return Ok(summary);
    }

    let total = suite.candidates();
    let mut index = suite.candidates_before(start);

    for (offset, line) in suite.lines()[start..].iter().enumerate() {
        let line_no = start + offset + 1;
        let raw = line.trim();
        if raw.is_empty() {
            ledger.append_blank().await?;
            summary.blank += 1;
            continue;
        }
        index += 1;

        let record = match epd_core::parse_with(raw, &options.parser) {
            Ok(record) => record,
            Err(failure) if failure.is_structural() => {
                ledger.append_blank().await?;
                summary.unannotated += 1;
                continue;
            }
            Err(failure) => {
                warn!(line = line_no, reason = %failure, raw, "Unparseable record kept for inspection");
                ledger.append_hard(raw).await?;
                summary.parse_failures += 1;
                continue;
            }
        };

        info!(
            index,
            total,
            line = line_no,
            kind = record.kind.opcode(),
            expected = %record.expected_move,
            "Position"
        );
        let assessment = assess(&record, options.movetime_ms, searcher).await?;
        match assessment.verdict() {
            Verdict::Hard => ledger.append_hard(raw).await?,
            Verdict::NotHard => ledger.append_blank().await?,
        }
        summary.tally(&assessment);
    }

    Ok(summary)
}

/// Full run: validate, start the engine, process the suite, shut down.
pub async fn run(config: &HarnessConfig) -> Result<RunSummary, HarnessError> {
    config.validate()?;
    let suite = Suite::load(&config.suite_path).await?;
    if suite.is_empty() {
        warn!(suite = %config.suite_path.display(), "Testsuite has no lines");
    }

    let mut session = EngineSession::spawn(&config.engine_path, &config.engine_args)?;
    let mut ledger = match Ledger::open(&config.result_path, config.resume).await {
        Ok(ledger) => ledger,
        Err(e) => {
            session.close().await?;
            return Err(e);
        }
    };
    info!(
        suite = %config.suite_path.display(),
        result = %ledger.path().display(),
        movetime_ms = config.movetime_ms,
        lines = suite.len(),
        "Running DBT, hard positions are written preserving line numbers"
    );

    let options = RunOptions {
        movetime_ms: config.movetime_ms,
        parser: config.parser,
    };
    let outcome = match session.configure(config.engine).await {
        Ok(()) => run_suite(&suite, &mut ledger, &mut session, &options).await,
        Err(e) => Err(e),
    };

    // Close the command stream and reap the engine before reporting anything.
    let closed = session.close().await;
    let summary = outcome.inspect_err(|e| {
        error!(error = %e, committed = ledger.lines(), "Run aborted, rerun with --resume to continue");
    })?;
    if let Some(status) = closed? {
        info!(%status, "Engine exited");
    }

    if let Some(path) = &config.summary_path {
        summary.write_json(path).await?;
    }
    Ok(summary)
}
