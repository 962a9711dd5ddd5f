//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time arrives as a caller-supplied millisecond clock, never wall time
//! - No rendering, audio synthesis, or platform dependencies

pub mod generator;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod timer;

pub use generator::SequenceGenerator;
pub use scheduler::{PlaybackEvent, PlaybackScheduler};
pub use session::{GameSession, InputOutcome, PadDisplay, ToneSink};
pub use state::{GameConfig, GameStats, RoundState, Symbol};
pub use timer::TimerQueue;
