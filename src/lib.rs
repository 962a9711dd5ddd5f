//! Tone Recall - a repeat-the-sequence pad memory game
//!
//! Core modules:
//! - `game`: Deterministic game core (sequence generation, playback
//!   scheduling, round state machine)
//! - `audio`: Web Audio tone collaborator (wasm32 only)
//! - `pads`: DOM pad flash/vibration collaborator (wasm32 only)
//! - `error`: Error taxonomy

pub mod error;
pub mod game;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod pads;

pub use error::GameError;
pub use game::{GameConfig, GameSession, GameStats, InputOutcome, RoundState, Symbol};

/// Game configuration constants
pub mod consts {
    /// How long each tone sounds and each pad stays lit (milliseconds)
    pub const TONE_DURATION_MS: u64 = 600;
    /// Silence between consecutive tones during playback (milliseconds)
    pub const PAUSE_DURATION_MS: u64 = 300;
    /// Lead-in before playback starts, so the UI can settle (milliseconds)
    pub const PRE_ROLL_MS: u64 = 500;
    /// Delay between a completed round and the next one (milliseconds)
    pub const INTER_ROUND_MS: u64 = 800;

    /// Number of pads in the default layout
    pub const DEFAULT_PAD_COUNT: u8 = 4;

    /// Per-pad tone frequencies in Hz, indexed by pad symbol
    pub const PAD_TONES_HZ: [f32; DEFAULT_PAD_COUNT as usize] = [261.63, 329.63, 392.0, 523.25];

    /// Haptic feedback pulse length on pad flash (milliseconds)
    pub const VIBRATE_MS: u32 = 50;
}
