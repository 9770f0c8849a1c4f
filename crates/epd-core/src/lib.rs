//! EPD-style test records: lenient parsing of hand-curated suite lines into
//! positions and canonical expected moves.

pub mod error;
pub mod notation;
pub mod record;

pub use error::{FailureReason, ParseFailure};
pub use record::{parse, parse_with, MoveKind, ParserOptions, Record};
