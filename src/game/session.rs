//! Round state machine
//!
//! `GameSession` owns the sequence, the player's input so far, the stats,
//! and the round state; nothing else mutates them. All entry points take
//! `&mut self`, so the host's single event loop serializes input against
//! scheduler callbacks by construction - a rapid double-tap can never
//! interleave two evaluations of the same round index.
//!
//! The host pumps [`GameSession::advance`] with the current session-clock
//! time each frame and feeds pad activations into
//! [`GameSession::submit_input`].

use super::generator::SequenceGenerator;
use super::scheduler::{PlaybackEvent, PlaybackScheduler};
use super::state::{GameConfig, GameStats, RoundState, Symbol};
use super::timer::TimerQueue;
use crate::error::GameError;

/// Tone output collaborator. `when_ms` is a session-clock start time; the
/// implementation converts it to its own device clock and sounds the symbol
/// for the configured tone duration.
pub trait ToneSink {
    fn play_tone(&mut self, symbol: Symbol, when_ms: u64);
}

/// Visual/haptic collaborator. Highlights the pad for the tone duration and
/// buzzes; fire-and-forget.
pub trait PadDisplay {
    fn flash(&mut self, symbol: Symbol);
}

/// What a single `submit_input` call amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Out-of-round tap: tone and flash fired, nothing evaluated
    Feedback,
    /// Matched the sequence at `position`; round continues
    Accepted { position: usize },
    /// Wrong symbol: input cleared, combo zeroed, sequence re-playing
    RoundFailed,
    /// Sequence reproduced in full; next round pending the inter-round delay
    RoundComplete { combo: u32 },
}

enum RoundTimer {
    NextRound,
}

/// One player's game: state machine, scheduler, and collaborators.
pub struct GameSession {
    config: GameConfig,
    generator: SequenceGenerator,
    scheduler: PlaybackScheduler,
    audio: Option<Box<dyn ToneSink>>,
    display: Box<dyn PadDisplay>,
    sequence: Vec<Symbol>,
    player_input: Vec<Symbol>,
    stats: GameStats,
    state: RoundState,
    /// Pending inter-round delay (next-round wakeup)
    round_timer: TimerQueue<RoundTimer>,
    round_tag: Option<u64>,
}

impl GameSession {
    /// Create a session. `audio` may be `None` (no tone output in this
    /// environment); the game then runs visual-only.
    pub fn new(
        config: GameConfig,
        seed: u64,
        audio: Option<Box<dyn ToneSink>>,
        display: Box<dyn PadDisplay>,
    ) -> Self {
        if audio.is_none() {
            log::warn!("no tone output available - running visual-only");
        }
        Self {
            config,
            generator: SequenceGenerator::new(seed, config.pad_count),
            scheduler: PlaybackScheduler::new(config),
            audio,
            display,
            sequence: Vec::new(),
            player_input: Vec::new(),
            stats: GameStats::default(),
            state: RoundState::Idle,
            round_timer: TimerQueue::new(),
            round_tag: None,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    /// The sequence the player must reproduce this round
    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    /// How many symbols the player has entered this round
    pub fn progress(&self) -> usize {
        self.player_input.len()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Start a fresh game: drop every pending timer from the previous one,
    /// reset level/combo/sequence, and play round one. No late callback
    /// from an abandoned round can touch the new round's state.
    pub fn start_game(&mut self, now_ms: u64) {
        self.scheduler.cancel();
        if let Some(tag) = self.round_tag.take() {
            self.round_timer.cancel_all(tag);
        }
        self.sequence.clear();
        self.player_input.clear();
        self.stats = GameStats::default();
        self.state = RoundState::Idle;
        log::info!("new game");
        self.start_next_round(now_ms);
    }

    /// Extend the sequence by one symbol and replay it. Called on game
    /// start and, via the inter-round timer, after each cleared round.
    pub fn start_next_round(&mut self, now_ms: u64) {
        self.player_input.clear();
        self.sequence = self.generator.extend(&self.sequence);
        self.stats.level = self.sequence.len() as u32;
        self.state = RoundState::Playing;
        self.scheduler.schedule(&self.sequence, now_ms);
        log::info!("round {} - replaying {} tones", self.stats.level, self.sequence.len());
    }

    /// Pump due timers. Dispatches tone/flash cues, flips to awaiting-input
    /// when playback finishes, and starts the next round once its delay
    /// elapses.
    pub fn advance(&mut self, now_ms: u64) {
        for event in self.scheduler.poll(now_ms) {
            match event {
                PlaybackEvent::PadCue { symbol, when_ms, .. } => self.cue_pad(symbol, when_ms),
                PlaybackEvent::Finished => {
                    if self.state == RoundState::Playing {
                        self.state = RoundState::AwaitingInput;
                        log::debug!("playback finished, awaiting input");
                    }
                }
            }
        }

        while let Some((RoundTimer::NextRound, _)) = self.round_timer.pop_due(now_ms) {
            self.round_tag = None;
            self.state = RoundState::Idle;
            self.start_next_round(now_ms);
        }
    }

    /// Feed one pad activation into the state machine.
    ///
    /// Any in-set symbol sounds and flashes immediately. It is evaluated
    /// against the sequence only while the round is awaiting input; taps
    /// before the game starts, during playback, or after a completed round
    /// are feedback-only.
    pub fn submit_input(&mut self, symbol: Symbol, now_ms: u64) -> Result<InputOutcome, GameError> {
        if !self.config.contains(symbol) {
            return Err(GameError::InvalidSymbol {
                symbol,
                pad_count: self.config.pad_count,
            });
        }

        self.cue_pad(symbol, now_ms);

        if self.sequence.is_empty() || self.state != RoundState::AwaitingInput {
            return Ok(InputOutcome::Feedback);
        }

        self.state = RoundState::Evaluating;

        let position = self.player_input.len();
        if position >= self.sequence.len() {
            // Race with round completion; already at full length
            self.state = RoundState::AwaitingInput;
            return Ok(InputOutcome::Feedback);
        }

        if symbol != self.sequence[position] {
            return Ok(self.fail_round(now_ms));
        }

        self.player_input.push(symbol);
        if self.player_input.len() == self.sequence.len() {
            self.stats.combo += 1;
            self.state = RoundState::RoundComplete;
            let tag = self.round_timer.next_tag();
            self.round_tag = Some(tag);
            self.round_timer
                .schedule_at(now_ms + self.config.inter_round_ms, tag, RoundTimer::NextRound);
            log::info!("round {} cleared, combo {}", self.stats.level, self.stats.combo);
            Ok(InputOutcome::RoundComplete {
                combo: self.stats.combo,
            })
        } else {
            self.state = RoundState::AwaitingInput;
            Ok(InputOutcome::Accepted { position })
        }
    }

    /// Wrong tone: keep the sequence, zero the combo, replay from the top.
    fn fail_round(&mut self, now_ms: u64) -> InputOutcome {
        self.state = RoundState::RoundFailed;
        self.player_input.clear();
        self.stats.combo = 0;
        log::info!("wrong tone at level {} - replaying", self.stats.level);
        self.state = RoundState::Playing;
        self.scheduler.schedule(&self.sequence, now_ms);
        InputOutcome::RoundFailed
    }

    /// Sound and light one pad from a single timeline entry.
    fn cue_pad(&mut self, symbol: Symbol, when_ms: u64) {
        if let Some(audio) = self.audio.as_mut() {
            audio.play_tone(symbol, when_ms);
        }
        self.display.flash(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ToneLog(Rc<RefCell<Vec<(Symbol, u64)>>>);

    impl ToneSink for ToneLog {
        fn play_tone(&mut self, symbol: Symbol, when_ms: u64) {
            self.0.borrow_mut().push((symbol, when_ms));
        }
    }

    #[derive(Clone, Default)]
    struct FlashLog(Rc<RefCell<Vec<Symbol>>>);

    impl PadDisplay for FlashLog {
        fn flash(&mut self, symbol: Symbol) {
            self.0.borrow_mut().push(symbol);
        }
    }

    fn session(seed: u64) -> (GameSession, ToneLog, FlashLog) {
        let tones = ToneLog::default();
        let flashes = FlashLog::default();
        let s = GameSession::new(
            GameConfig::default(),
            seed,
            Some(Box::new(tones.clone())),
            Box::new(flashes.clone()),
        );
        (s, tones, flashes)
    }

    /// Advance past the whole playback pass; returns a time safely after the
    /// finished marker.
    fn finish_playback(s: &mut GameSession, from_ms: u64) -> u64 {
        let cfg = GameConfig::default();
        let t = from_ms + cfg.pre_roll_ms + s.sequence().len() as u64 * cfg.step_ms()
            + cfg.tone_duration_ms;
        s.advance(t);
        assert_eq!(s.state(), RoundState::AwaitingInput);
        t
    }

    /// Reproduce the current sequence correctly; returns (time, final outcome).
    fn play_round_perfectly(s: &mut GameSession, mut t: u64) -> (u64, InputOutcome) {
        let seq = s.sequence().to_vec();
        let mut last = InputOutcome::Feedback;
        for sym in seq {
            t += 10;
            last = s.submit_input(sym, t).unwrap();
        }
        (t, last)
    }

    #[test]
    fn test_start_game_builds_level_one() {
        let (mut s, tones, _) = session(42);
        s.start_game(0);
        assert_eq!(s.state(), RoundState::Playing);
        assert_eq!(s.stats().level, 1);
        assert_eq!(s.sequence().len(), 1);

        let t = finish_playback(&mut s, 0);
        // Exactly one cue, scheduled at the pre-roll
        let tones = tones.0.borrow();
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0].1, 500);
        assert!(t >= 500);
    }

    #[test]
    fn test_level_tracks_sequence_len_across_rounds() {
        let (mut s, _, _) = session(42);
        s.start_game(0);
        let mut t = finish_playback(&mut s, 0);
        for round in 1..=5u32 {
            assert_eq!(s.stats().level, round);
            assert_eq!(s.sequence().len() as u32, round);
            let (after, outcome) = play_round_perfectly(&mut s, t);
            assert_eq!(outcome, InputOutcome::RoundComplete { combo: round });
            t = after + GameConfig::default().inter_round_ms;
            s.advance(t);
            t = finish_playback(&mut s, t);
        }
        assert_eq!(s.stats().combo, 5);
    }

    #[test]
    fn test_next_round_keeps_old_prefix() {
        let (mut s, _, _) = session(42);
        s.start_game(0);
        let mut t = finish_playback(&mut s, 0);
        let first = s.sequence().to_vec();

        let (after, _) = play_round_perfectly(&mut s, t);
        t = after + GameConfig::default().inter_round_ms;
        s.advance(t);
        assert_eq!(s.sequence().len(), 2);
        assert_eq!(&s.sequence()[..1], &first[..]);
    }

    #[test]
    fn test_round_complete_fires_exactly_once() {
        let (mut s, _, _) = session(42);
        s.start_game(0);
        let t = finish_playback(&mut s, 0);
        let sym = s.sequence()[0];

        let outcome = s.submit_input(sym, t + 10).unwrap();
        assert_eq!(outcome, InputOutcome::RoundComplete { combo: 1 });

        // Extra matching input before the next round starts is ignored
        let outcome = s.submit_input(sym, t + 20).unwrap();
        assert_eq!(outcome, InputOutcome::Feedback);
        assert_eq!(s.stats().combo, 1);
        assert_eq!(s.progress(), 1);
    }

    #[test]
    fn test_wrong_input_fails_and_replays_same_sequence() {
        let (mut s, _, flashes) = session(42);
        s.start_game(0);
        let mut t = finish_playback(&mut s, 0);
        let (after, _) = play_round_perfectly(&mut s, t);
        t = after + GameConfig::default().inter_round_ms;
        s.advance(t);
        t = finish_playback(&mut s, t);

        // Level 2: first symbol right, second wrong
        let seq = s.sequence().to_vec();
        assert_eq!(seq.len(), 2);
        assert_eq!(
            s.submit_input(seq[0], t + 10).unwrap(),
            InputOutcome::Accepted { position: 0 }
        );
        let wrong = Symbol((seq[1].0 + 1) % 4);
        assert_eq!(s.submit_input(wrong, t + 20).unwrap(), InputOutcome::RoundFailed);

        assert_eq!(s.stats().combo, 0);
        assert_eq!(s.progress(), 0);
        assert_eq!(s.sequence(), &seq[..], "sequence must not be regenerated");
        assert_eq!(s.state(), RoundState::Playing);

        // The replay actually sounds out: both cues flash again
        let before = flashes.0.borrow().len();
        finish_playback(&mut s, t + 20);
        assert_eq!(flashes.0.borrow().len(), before + 2);
    }

    #[test]
    fn test_input_before_start_is_feedback_only() {
        let (mut s, tones, flashes) = session(42);
        let outcome = s.submit_input(Symbol(1), 5).unwrap();
        assert_eq!(outcome, InputOutcome::Feedback);
        assert_eq!(s.state(), RoundState::Idle);
        assert_eq!(s.stats(), GameStats::default());
        assert_eq!(s.progress(), 0);
        // The tap still sounds and lights up
        assert_eq!(tones.0.borrow().as_slice(), &[(Symbol(1), 5)]);
        assert_eq!(flashes.0.borrow().as_slice(), &[Symbol(1)]);
    }

    #[test]
    fn test_input_during_playback_not_evaluated() {
        let (mut s, _, _) = session(42);
        s.start_game(0);
        let sym = s.sequence()[0];
        // Still replaying
        assert_eq!(s.submit_input(sym, 100).unwrap(), InputOutcome::Feedback);
        assert_eq!(s.progress(), 0);
        assert_eq!(s.state(), RoundState::Playing);
    }

    #[test]
    fn test_invalid_symbol_rejected_without_side_effects() {
        let (mut s, tones, flashes) = session(42);
        s.start_game(0);
        let err = s.submit_input(Symbol(9), 100).unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidSymbol {
                symbol: Symbol(9),
                pad_count: 4
            }
        );
        assert!(tones.0.borrow().is_empty());
        assert!(flashes.0.borrow().is_empty());
    }

    #[test]
    fn test_new_game_cancels_in_flight_playback() {
        let (mut s, _, flashes) = session(42);
        s.start_game(0);
        let mut t = finish_playback(&mut s, 0);
        let (after, _) = play_round_perfectly(&mut s, t);
        t = after + GameConfig::default().inter_round_ms;
        s.advance(t);
        assert_eq!(s.sequence().len(), 2);

        // Round 2 playback is pending (nothing fired yet); restart now
        let before = flashes.0.borrow().len();
        s.start_game(t);
        assert_eq!(s.stats(), GameStats { level: 1, combo: 0 });

        // Only the new round's single cue may ever surface
        finish_playback(&mut s, t);
        assert_eq!(flashes.0.borrow().len(), before + 1);
    }

    #[test]
    fn test_new_game_cancels_pending_next_round_timer() {
        let (mut s, _, _) = session(42);
        s.start_game(0);
        let t = finish_playback(&mut s, 0);
        let (after, outcome) = play_round_perfectly(&mut s, t);
        assert!(matches!(outcome, InputOutcome::RoundComplete { .. }));

        // Restart before the inter-round delay elapses
        s.start_game(after + 1);
        assert_eq!(s.sequence().len(), 1);

        // The stale next-round wakeup must not fire a second extension
        s.advance(after + GameConfig::default().inter_round_ms + 100);
        assert_eq!(s.sequence().len(), 1);
    }

    #[test]
    fn test_inter_round_delay_is_exact() {
        let (mut s, _, _) = session(42);
        s.start_game(0);
        let t = finish_playback(&mut s, 0);
        let sym = s.sequence()[0];
        s.submit_input(sym, t).unwrap();
        assert_eq!(s.state(), RoundState::RoundComplete);

        s.advance(t + 799);
        assert_eq!(s.state(), RoundState::RoundComplete);
        s.advance(t + 800);
        assert_eq!(s.state(), RoundState::Playing);
        assert_eq!(s.stats().level, 2);
    }

    #[test]
    fn test_combo_resets_on_failure_only() {
        let (mut s, _, _) = session(7);
        s.start_game(0);
        let mut t = finish_playback(&mut s, 0);
        for _ in 0..3 {
            let (after, _) = play_round_perfectly(&mut s, t);
            t = after + GameConfig::default().inter_round_ms;
            s.advance(t);
            t = finish_playback(&mut s, t);
        }
        assert_eq!(s.stats().combo, 3);

        let wrong = Symbol((s.sequence()[0].0 + 1) % 4);
        s.submit_input(wrong, t + 5).unwrap();
        assert_eq!(s.stats().combo, 0);
        assert_eq!(s.stats().level, 4, "level survives failure");
    }

    #[test]
    fn test_visual_only_session_plays_full_rounds() {
        let flashes = FlashLog::default();
        let mut s = GameSession::new(GameConfig::default(), 42, None, Box::new(flashes.clone()));
        assert!(!s.has_audio());

        s.start_game(0);
        let t = finish_playback(&mut s, 0);
        assert!(!flashes.0.borrow().is_empty());

        let sym = s.sequence()[0];
        let outcome = s.submit_input(sym, t + 10).unwrap();
        assert_eq!(outcome, InputOutcome::RoundComplete { combo: 1 });
    }

    #[test]
    fn test_determinism_same_seed_same_game() {
        let (mut a, _, _) = session(2024);
        let (mut b, _, _) = session(2024);
        a.start_game(0);
        b.start_game(0);
        let mut ta = finish_playback(&mut a, 0);
        let mut tb = finish_playback(&mut b, 0);
        for _ in 0..6 {
            assert_eq!(a.sequence(), b.sequence());
            let (na, _) = play_round_perfectly(&mut a, ta);
            let (nb, _) = play_round_perfectly(&mut b, tb);
            ta = na + 800;
            tb = nb + 800;
            a.advance(ta);
            b.advance(tb);
            ta = finish_playback(&mut a, ta);
            tb = finish_playback(&mut b, tb);
        }
    }
}
