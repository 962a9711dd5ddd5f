//! Timed sequence playback
//!
//! Converts a sequence into a strictly ordered stream of due pad cues plus a
//! playback-finished marker. One timeline entry drives both the tone and the
//! flash, so sound and light can never drift apart.
//!
//! The scheduler owns only its timer queue and the tag of the pass in
//! flight; it keeps no game state across rounds. Re-scheduling or
//! cancelling bumps the generation tag, and anything left from the old pass
//! is dropped unseen.

use serde::{Deserialize, Serialize};

use super::state::{GameConfig, Symbol};
use super::timer::TimerQueue;

/// A due playback event, returned by [`PlaybackScheduler::poll`] in strict
/// schedule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Pad `symbol` (the `index`-th element of the sequence) is due.
    /// `when_ms` is the scheduled start on the session clock; the audio
    /// collaborator converts it to a device-clock start time.
    PadCue {
        symbol: Symbol,
        index: usize,
        when_ms: u64,
    },
    /// The whole sequence has sounded out (fires one tone-length after the
    /// last cue's start).
    Finished,
}

enum Slot {
    Cue { symbol: Symbol, index: usize },
    Finished,
}

/// Schedules one playback pass of a sequence at a time.
pub struct PlaybackScheduler {
    config: GameConfig,
    queue: TimerQueue<Slot>,
    current_tag: Option<u64>,
}

impl PlaybackScheduler {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            queue: TimerQueue::new(),
            current_tag: None,
        }
    }

    /// Begin a playback pass for `sequence`, superseding any pass still in
    /// flight. Cue `i` is due at `now + pre_roll + i * (tone + pause)`; the
    /// finished marker one tone-length after the final cue.
    pub fn schedule(&mut self, sequence: &[Symbol], now_ms: u64) {
        self.cancel();

        let tag = self.queue.next_tag();
        self.current_tag = Some(tag);

        let base = now_ms + self.config.pre_roll_ms;
        let mut finished_at = base;
        for (index, &symbol) in sequence.iter().enumerate() {
            let due = base + index as u64 * self.config.step_ms();
            self.queue.schedule_at(due, tag, Slot::Cue { symbol, index });
            finished_at = due + self.config.tone_duration_ms;
        }
        self.queue.schedule_at(finished_at, tag, Slot::Finished);
    }

    /// Drop every pending entry of the pass in flight. Late polls observe
    /// nothing from a cancelled pass.
    pub fn cancel(&mut self) {
        if let Some(tag) = self.current_tag.take() {
            self.queue.cancel_all(tag);
        }
    }

    /// Whether a pass is still emitting (finished marker not yet polled)
    pub fn is_active(&self) -> bool {
        self.current_tag.is_some()
    }

    /// Collect every event due by `now_ms`, in strict schedule order.
    pub fn poll(&mut self, now_ms: u64) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Some((slot, due_ms)) = self.queue.pop_due(now_ms) {
            match slot {
                Slot::Cue { symbol, index } => events.push(PlaybackEvent::PadCue {
                    symbol,
                    index,
                    when_ms: due_ms,
                }),
                Slot::Finished => {
                    self.current_tag = None;
                    events.push(PlaybackEvent::Finished);
                }
            }
        }
        events
    }
}
