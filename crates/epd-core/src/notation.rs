//! Move and position notation helpers built on shakmaty.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, PositionError};

/// Characters that trail a move annotation in curated suites: opcode
/// separators, alternative-move separators and good-move markers.
const ANNOTATION_PUNCTUATION: [char; 4] = [';', ',', '!', '?'];

/// Parse a FEN string into a position. Castling rights that do not match
/// the board are dropped rather than rejecting the whole position.
pub fn position_from_fen(text: &str) -> Option<Chess> {
    let fen: Fen = text.trim().parse().ok()?;
    fen.into_position::<Chess>(CastlingMode::Standard)
        .or_else(PositionError::ignore_invalid_castling_rights)
        .ok()
}

/// Render a position as FEN for the engine's `position fen` command.
pub fn position_to_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Reduce a raw move annotation to a single move token.
///
/// `"Nf3!; c0 \"comment\";"` becomes `"Nf3"`, `"0-0-0,"` becomes `"O-O-O"`.
pub fn normalize_move_text(fragment: &str) -> Option<String> {
    let cleaned: String = fragment
        .chars()
        .map(|c| if ANNOTATION_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    let token = cleaned.split_whitespace().next()?;
    Some(normalize_castling(token))
}

fn normalize_castling(token: &str) -> String {
    let (body, suffix) = match token.find(['+', '#']) {
        Some(i) => token.split_at(i),
        None => (token, ""),
    };
    let body = match body {
        "0-0-0" | "o-o-o" => "O-O-O",
        "0-0" | "o-o" => "O-O",
        other => other,
    };
    format!("{body}{suffix}")
}

/// Resolve short algebraic notation (with or without check suffix) to a
/// legal move.
pub fn san_to_move(pos: &Chess, text: &str) -> Option<Move> {
    let san: SanPlus = text.parse().ok()?;
    san.san.to_move(pos).ok()
}

/// Resolve coordinate notation (`e2e4`, `e7e8q`) to a legal move.
pub fn uci_to_move(pos: &Chess, text: &str) -> Option<Move> {
    let uci: UciMove = text.parse().ok()?;
    uci.to_move(pos).ok()
}

/// Canonical short algebraic rendering of a legal move, without suffix.
pub fn move_to_san(pos: &Chess, mv: Move) -> String {
    San::from_move(pos, mv).to_string()
}

/// Convert an engine's coordinate move to canonical SAN at `pos`.
pub fn uci_to_san(pos: &Chess, text: &str) -> Option<String> {
    let mv = uci_to_move(pos, text)?;
    Some(move_to_san(pos, mv))
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_normalize_strips_annotations() {
        assert_eq!(normalize_move_text(" Nf3!; id \"x\";").as_deref(), Some("Nf3"));
        assert_eq!(normalize_move_text("Qxd5, Qc4;").as_deref(), Some("Qxd5"));
        assert_eq!(normalize_move_text("Rd1+!?").as_deref(), Some("Rd1+"));
        assert_eq!(normalize_move_text(" ;"), None);
    }

    #[test]
    fn test_normalize_castling_variants() {
        assert_eq!(normalize_move_text("0-0;").as_deref(), Some("O-O"));
        assert_eq!(normalize_move_text("0-0-0+").as_deref(), Some("O-O-O+"));
        assert_eq!(normalize_move_text("o-o").as_deref(), Some("O-O"));
        assert_eq!(normalize_move_text("O-O-O").as_deref(), Some("O-O-O"));
    }

    #[test]
    fn test_uci_to_san() {
        let pos = position_from_fen(START_FEN).unwrap();
        assert_eq!(uci_to_san(&pos, "g1f3").as_deref(), Some("Nf3"));
        assert_eq!(uci_to_san(&pos, "e2e5"), None);
        assert_eq!(uci_to_san(&pos, "(none)"), None);
    }

    #[test]
    fn test_san_accepts_check_suffix() {
        // Scholar's mate setup: Qxf7 is mate.
        let pos = position_from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        )
        .unwrap();
        let plain = san_to_move(&pos, "Qxf7").unwrap();
        let suffixed = san_to_move(&pos, "Qxf7#").unwrap();
        assert_eq!(plain, suffixed);
        assert_eq!(move_to_san(&pos, plain), "Qxf7");
    }

    #[test]
    fn test_castling_rights_without_rooks_are_dropped() {
        let pos = position_from_fen("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1").unwrap();
        assert_eq!(position_to_fen(&pos), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn test_uci_castling_renders_as_san() {
        let pos = position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(uci_to_san(&pos, "e1g1").as_deref(), Some("O-O"));
        assert_eq!(uci_to_san(&pos, "e1c1").as_deref(), Some("O-O-O"));
    }

    #[test]
    fn test_fen_round_trip_start() {
        let pos = position_from_fen(START_FEN).unwrap();
        assert_eq!(position_to_fen(&pos), START_FEN);
    }
}
