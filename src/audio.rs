//! Tone output using the Web Audio API
//!
//! One sine oscillator per tone, scheduled on the audio device clock - no
//! sample files needed. The session hands over a session-clock start time
//! (`performance.now()` milliseconds); the conversion to
//! `AudioContext.currentTime` happens here, so the core never touches device
//! time.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::consts::{PAD_TONES_HZ, TONE_DURATION_MS};
use crate::error::GameError;
use crate::game::{Symbol, ToneSink};

const TONE_GAIN: f32 = 0.4;

/// Web Audio collaborator for pad tones.
#[derive(Clone)]
pub struct WebAudio {
    ctx: AudioContext,
}

impl WebAudio {
    /// Try to create an audio context. Fails where Web Audio is unsupported
    /// (the game then runs visual-only and the host shows a fallback notice).
    pub fn new() -> Result<Self, GameError> {
        let ctx = AudioContext::new().map_err(|_| {
            log::warn!("failed to create AudioContext - audio disabled");
            GameError::AudioUnavailable
        })?;
        Ok(Self { ctx })
    }

    /// Resume the context after a user gesture (browsers start it suspended).
    pub fn resume(&self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    /// Create a sine oscillator routed through a gain node
    fn create_osc(&self, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = self.ctx.create_oscillator().ok()?;
        let gain = self.ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Session clock (performance.now) in milliseconds
    fn session_now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }
}

impl ToneSink for WebAudio {
    fn play_tone(&mut self, symbol: Symbol, when_ms: u64) {
        self.resume();

        let Some(&freq) = PAD_TONES_HZ.get(symbol.index()) else {
            return;
        };
        let Some((osc, gain)) = self.create_osc(freq) else {
            return;
        };

        // Session-clock lead time maps onto the device clock
        let lead_s = ((when_ms as f64 - Self::session_now_ms()) / 1000.0).max(0.0);
        let start = self.ctx.current_time() + lead_s;
        let stop = start + TONE_DURATION_MS as f64 / 1000.0;

        gain.gain().set_value(TONE_GAIN);
        let _ = osc.start_with_when(start);
        let _ = osc.stop_with_when(stop);
    }
}
