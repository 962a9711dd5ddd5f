//! Error taxonomy for the game core
//!
//! Mismatched input is deliberately *not* here: a wrong tone is normal game
//! logic (`InputOutcome::RoundFailed`), not an error.

use thiserror::Error;

use crate::game::Symbol;

/// Errors reported synchronously by the core API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Web Audio (or equivalent tone output) is unavailable in this
    /// environment. The game still runs visual-only; the host decides
    /// whether to surface a fallback notice.
    #[error("audio output is unavailable in this environment")]
    AudioUnavailable,

    /// A submitted symbol is outside the fixed pad set. Rejected with no
    /// state mutation and no feedback.
    #[error("symbol {symbol:?} is outside the pad set (0..{pad_count})")]
    InvalidSymbol { symbol: Symbol, pad_count: u8 },
}
