//! Lenient parser for EPD-style suite lines.
//!
//! Suites are hand-curated and often carry truncated FENs, trailing
//! commentary and odd castling spellings. Each stage tries the strictest
//! reading first and only then falls back to looser ones.

use once_cell::sync::Lazy;
use regex::Regex;
use shakmaty::Chess;

use crate::error::{FailureReason, ParseFailure};
use crate::notation;

/// The first opcode token in the line splits position from move annotation.
static OPCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(bm|am|pm)(?:\s|$)").expect("opcode pattern is valid"));

/// Role of the annotated move, taken from the opcode that introduced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// `bm`: claimed best move
    Best,
    /// `am`: move to avoid
    Avoid,
    /// `pm`: claimed single proved best move
    Proved,
}

impl MoveKind {
    pub fn opcode(self) -> &'static str {
        match self {
            MoveKind::Best => "bm",
            MoveKind::Avoid => "am",
            MoveKind::Proved => "pm",
        }
    }

    fn from_opcode(opcode: &str) -> Option<Self> {
        match opcode {
            "bm" => Some(MoveKind::Best),
            "am" => Some(MoveKind::Avoid),
            "pm" => Some(MoveKind::Proved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Accept coordinate notation (`g1f3`) when SAN resolution fails.
    pub coordinate_moves: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            coordinate_moves: true,
        }
    }
}

/// A suite line that parsed into a legal position and expected move.
#[derive(Debug, Clone)]
pub struct Record {
    pub raw: String,
    pub position: Chess,
    /// Canonical SAN of the annotated move at `position`.
    pub expected_move: String,
    pub kind: MoveKind,
}

impl Record {
    pub fn fen(&self) -> String {
        notation::position_to_fen(&self.position)
    }

    /// Position reached by playing the expected move.
    pub fn position_after_expected(&self) -> Option<Chess> {
        let mv = notation::san_to_move(&self.position, &self.expected_move)?;
        shakmaty::Position::play(self.position.clone(), mv).ok()
    }
}

/// Parse one suite line with default options.
pub fn parse(raw: &str) -> Result<Record, ParseFailure> {
    parse_with(raw, &ParserOptions::default())
}

pub fn parse_with(raw: &str, options: &ParserOptions) -> Result<Record, ParseFailure> {
    let (opcode, kind) = OPCODE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| MoveKind::from_opcode(m.as_str()).map(|kind| (m, kind)))
        .ok_or_else(|| ParseFailure::new(raw, FailureReason::NoMoveAnnotation))?;

    let position_fragment = &raw[..opcode.start()];
    let move_fragment = &raw[opcode.end()..];

    let position = reconstruct_position(position_fragment).ok_or_else(|| {
        ParseFailure::new(
            raw,
            FailureReason::InvalidPosition(position_fragment.trim().to_string()),
        )
    })?;

    let expected_move = resolve_move(&position, move_fragment, options).ok_or_else(|| {
        ParseFailure::new(
            raw,
            FailureReason::InvalidMove(move_fragment.trim().to_string()),
        )
    })?;

    Ok(Record {
        raw: raw.to_string(),
        position,
        expected_move,
        kind,
    })
}

/// Verbatim, then the first six fields, then the first four fields with
/// default move counters.
fn reconstruct_position(fragment: &str) -> Option<Chess> {
    let fields: Vec<&str> = fragment.split_whitespace().collect();
    let six = fields[..fields.len().min(6)].join(" ");
    let four = format!("{} 0 1", fields[..fields.len().min(4)].join(" "));

    [fragment.trim().to_string(), six, four]
        .iter()
        .find_map(|attempt| notation::position_from_fen(attempt))
}

fn resolve_move(position: &Chess, fragment: &str, options: &ParserOptions) -> Option<String> {
    let token = notation::normalize_move_text(fragment)?;

    let mv = notation::san_to_move(position, &token)
        .or_else(|| notation::san_to_move(position, &format!("{token}+")))
        .or_else(|| {
            if options.coordinate_moves {
                notation::uci_to_move(position, &token)
            } else {
                None
            }
        })?;

    Some(notation::move_to_san(position, mv))
}
