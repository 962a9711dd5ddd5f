//! Core game state types
//!
//! Everything the round state machine owns is declared here.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Opaque identifier for one pad/tone. Valid symbols are `0..pad_count`,
/// fixed at session construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub u8);

impl Symbol {
    /// Pad index backing this symbol
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// No game in progress
    Idle,
    /// Scheduler is replaying the sequence; input is feedback-only
    Playing,
    /// Playback finished, waiting for the player to reproduce the sequence
    AwaitingInput,
    /// Transient: an input is being compared against the sequence
    Evaluating,
    /// Sequence reproduced in full; next round is pending the inter-round delay
    RoundComplete,
    /// Wrong input ended the attempt; the same sequence is being re-played
    RoundFailed,
}

/// Progress counters shown on the HUD
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Current sequence length / round number
    pub level: u32,
    /// Consecutive successful rounds since the last failure
    pub combo: u32,
}

/// Timing and pad-set configuration, fixed at construction.
///
/// Exposed for tuning and for fast simulated-clock tests; never changed at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of pads (size of the symbol set)
    pub pad_count: u8,
    /// Tone/flash length in milliseconds
    pub tone_duration_ms: u64,
    /// Silence between playback tones in milliseconds
    pub pause_duration_ms: u64,
    /// Lead-in before playback starts in milliseconds
    pub pre_roll_ms: u64,
    /// Delay between a cleared round and the next in milliseconds
    pub inter_round_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pad_count: DEFAULT_PAD_COUNT,
            tone_duration_ms: TONE_DURATION_MS,
            pause_duration_ms: PAUSE_DURATION_MS,
            pre_roll_ms: PRE_ROLL_MS,
            inter_round_ms: INTER_ROUND_MS,
        }
    }
}

impl GameConfig {
    /// Milliseconds from one playback tone's start to the next
    pub fn step_ms(&self) -> u64 {
        self.tone_duration_ms + self.pause_duration_ms
    }

    /// Whether `symbol` belongs to the configured pad set
    pub fn contains(&self, symbol: Symbol) -> bool {
        symbol.0 < self.pad_count
    }
}
