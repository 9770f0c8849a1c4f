//! Engine output parsing for one search request.

use std::fmt;

use crate::error::HarnessError;

/// Evaluation reported by the engine, from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates)
    Mate(i32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "cp {cp}"),
            Score::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Result of a single search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move in coordinate notation, as the engine sent it
    pub best_move: String,
    /// Last score reported before the best move
    pub score: Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    AwaitingResult,
    Done,
}

/// Consumes engine output lines until the `bestmove` line.
///
/// Every score seen replaces the previous one, so the deepest score wins.
#[derive(Debug)]
pub struct SearchReader {
    state: ReaderState,
    last_score: Option<Score>,
    best_move: Option<String>,
}

impl Default for SearchReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchReader {
    pub fn new() -> Self {
        Self {
            state: ReaderState::AwaitingResult,
            last_score: None,
            best_move: None,
        }
    }

    /// Feed one output line; returns true once the search has finished.
    pub fn feed(&mut self, line: &str) -> bool {
        if self.state == ReaderState::Done {
            return true;
        }
        if let Some(best_move) = parse_bestmove(line) {
            self.best_move = best_move;
            self.state = ReaderState::Done;
        } else if let Some(score) = parse_score(line) {
            self.last_score = Some(score);
        }
        self.state == ReaderState::Done
    }

    pub fn is_done(&self) -> bool {
        self.state == ReaderState::Done
    }

    pub fn finish(self) -> Result<SearchResult, HarnessError> {
        if self.state != ReaderState::Done {
            return Err(HarnessError::EngineExited);
        }
        let best_move = self
            .best_move
            .ok_or_else(|| HarnessError::Protocol("bestmove line without a move".into()))?;
        let score = self.last_score.ok_or_else(|| {
            HarnessError::Protocol(format!("no score reported before bestmove {best_move}"))
        })?;
        Ok(SearchResult { best_move, score })
    }
}

/// Parse `score cp <n>` or `score mate <n>` from an info line.
pub fn parse_score(line: &str) -> Option<Score> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let i = parts.iter().position(|part| *part == "score")?;
    let value = parts.get(i + 2)?.parse().ok()?;
    match *parts.get(i + 1)? {
        "cp" => Some(Score::Centipawns(value)),
        "mate" => Some(Score::Mate(value)),
        _ => None,
    }
}

/// `None` if the line has no `bestmove` token, `Some(None)` if the token has
/// no move after it.
fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut parts = line.split_whitespace();
    parts.by_ref().find(|part| *part == "bestmove")?;
    Some(parts.next().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(parse_score(line), Some(Score::Centipawns(35)));
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        assert_eq!(parse_score(line), Some(Score::Mate(-3)));
    }

    #[test]
    fn test_parse_bound_score() {
        let line = "info depth 12 score cp -18 lowerbound nodes 4000 pv d2d4";
        assert_eq!(parse_score(line), Some(Score::Centipawns(-18)));
    }

    #[test]
    fn test_lines_without_score_are_ignored() {
        assert_eq!(parse_score("info string NNUE evaluation enabled"), None);
        assert_eq!(parse_score("info depth 1 score"), None);
        assert_eq!(parse_score("readyok"), None);
    }

    #[test]
    fn test_last_score_before_bestmove_wins() {
        let mut reader = SearchReader::new();
        assert!(!reader.feed("Stockfish 16 by the Stockfish developers"));
        assert!(!reader.feed("info depth 1 score cp 12 nodes 20 pv e2e4"));
        assert!(!reader.feed("info depth 2 score mate 5 nodes 80 pv e2e4"));
        assert!(!reader.feed("info depth 3 score cp 41 nodes 200 pv d2d4"));
        assert!(!reader.feed("garbage that matches nothing"));
        assert!(reader.feed("bestmove d2d4 ponder d7d5"));
        assert!(reader.feed("info depth 4 score cp 99 nodes 900 pv c2c4"));

        let result = reader.finish().unwrap();
        assert_eq!(result.best_move, "d2d4");
        assert_eq!(result.score, Score::Centipawns(41));
    }

    #[test]
    fn test_unfinished_search_is_engine_exit() {
        let mut reader = SearchReader::new();
        reader.feed("info depth 1 score cp 12 pv e2e4");
        assert!(!reader.is_done());
        assert!(matches!(reader.finish(), Err(HarnessError::EngineExited)));
    }

    #[test]
    fn test_bestmove_without_score_is_protocol_error() {
        let mut reader = SearchReader::new();
        reader.feed("bestmove e2e4");
        assert!(matches!(reader.finish(), Err(HarnessError::Protocol(_))));
    }

    #[test]
    fn test_bare_bestmove_token_is_protocol_error() {
        let mut reader = SearchReader::new();
        reader.feed("info depth 1 score cp 3 pv e2e4");
        assert!(reader.feed("bestmove"));
        assert!(matches!(reader.finish(), Err(HarnessError::Protocol(_))));
    }

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Centipawns(-40).to_string(), "cp -40");
        assert_eq!(Score::Mate(2).to_string(), "mate 2");
    }
}
