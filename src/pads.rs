//! Pad flash and haptic feedback via the DOM
//!
//! Flashing toggles the `active` CSS class for one tone-length and pulses
//! the vibration motor where the device has one.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element};

use crate::consts::{TONE_DURATION_MS, VIBRATE_MS};
use crate::game::{PadDisplay, Symbol};

/// DOM-backed pad collaborator: one `.pad` element per symbol, in document
/// order.
pub struct PadBoard {
    pads: Vec<Element>,
}

impl PadBoard {
    /// Collect the `.pad` elements. Symbol `i` maps to the `i`-th pad.
    pub fn from_document(document: &Document) -> Self {
        let mut pads = Vec::new();
        if let Ok(list) = document.query_selector_all(".pad") {
            for i in 0..list.length() {
                if let Some(el) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    pads.push(el);
                }
            }
        }
        if pads.is_empty() {
            log::warn!("no .pad elements found - flashes will be dropped");
        }
        Self { pads }
    }

    pub fn pad_count(&self) -> usize {
        self.pads.len()
    }
}

impl PadDisplay for PadBoard {
    fn flash(&mut self, symbol: Symbol) {
        let Some(pad) = self.pads.get(symbol.index()) else {
            return;
        };
        let _ = pad.class_list().add_1("active");

        // Unlight after one tone-length
        let pad = pad.clone();
        let unlight = Closure::once_into_js(move || {
            let _ = pad.class_list().remove_1("active");
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                unlight.unchecked_ref(),
                TONE_DURATION_MS as i32,
            );
            let _ = window.navigator().vibrate_with_duration(VIBRATE_MS);
        }
    }
}
