/*
 *  viewport.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Auto-scroll controller: eases the visible frequency window toward the
 *  highlighted point, with a fast catch-up tier and manual override.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::constants::*;

/// Discrete input events from the external input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    ScrollUp,
    ScrollDown,
    JumpStart,
    JumpEnd,
}

/// Visible-window state machine, advanced once per frame.
#[derive(Debug, Clone)]
pub struct Viewport {
    start_freq_mhz: i32,
    accel: i32,
    manual_scroll: bool,
    width_px: u32,
}

impl Viewport {
    pub fn new(width_px: u32) -> Self {
        Self {
            start_freq_mhz: VIEW_START_MHZ,
            accel: 0,
            manual_scroll: false,
            width_px,
        }
    }

    pub fn start_freq_mhz(&self) -> i32 {
        self.start_freq_mhz
    }

    pub fn accel(&self) -> i32 {
        self.accel
    }

    pub fn is_manual(&self) -> bool {
        self.manual_scroll
    }

    /// MHz spanned by the raster at the fixed pixel scale.
    pub fn visible_mhz(&self) -> i32 {
        self.width_px as i32 / X_SCALE
    }

    /// Nudge the window toward the highlighted frequency. Suppressed
    /// while a manual scroll is in effect.
    pub fn auto_track(&mut self, highlight_mhz: i32) {
        if self.manual_scroll {
            return;
        }
        let right_edge = self.start_freq_mhz + self.visible_mhz();

        if highlight_mhz - TRACK_MARGIN_MHZ < self.start_freq_mhz {
            self.accel = -TRACK_ACCEL;
        }
        if highlight_mhz > right_edge {
            self.accel = TRACK_ACCEL;
        }

        // far off the window: move a lot faster
        if highlight_mhz + CATCHUP_MARGIN_MHZ < self.start_freq_mhz {
            self.accel = -CATCHUP_ACCEL;
        }
        if highlight_mhz - CATCHUP_MARGIN_MHZ > right_edge {
            self.accel = CATCHUP_ACCEL;
        }
    }

    /// Apply one input event. `Quit` is the render loop's business and is
    /// ignored here.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::ScrollUp => {
                self.accel -= MANUAL_ACCEL_STEP;
                self.manual_scroll = true;
            }
            InputEvent::ScrollDown => {
                self.accel += MANUAL_ACCEL_STEP;
                self.manual_scroll = true;
            }
            InputEvent::JumpStart => {
                self.start_freq_mhz = BAND_START_MHZ;
                self.accel = 0;
                self.manual_scroll = false;
            }
            InputEvent::JumpEnd => {
                // land with the upper band edge on-screen
                self.start_freq_mhz = (BAND_END_MHZ - self.visible_mhz()).max(BAND_START_MHZ);
                self.accel = 0;
                self.manual_scroll = false;
            }
            InputEvent::Quit => {}
        }
    }

    /// Advance one frame: apply acceleration, decay it one step toward
    /// zero, then clamp both values. Returns true when the window moved.
    pub fn step(&mut self) -> bool {
        let moved = self.accel != 0;
        if moved {
            self.start_freq_mhz += self.accel;
            if self.accel > 0 {
                self.accel -= 1;
            } else {
                self.accel += 1;
            }
        }
        self.start_freq_mhz = self.start_freq_mhz.clamp(BAND_START_MHZ, BAND_END_MHZ);
        self.accel = self.accel.clamp(-ACCEL_LIMIT, ACCEL_LIMIT);
        moved
    }
}
