/*
 *  pacer.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Frame pacing for the render loop: a fixed-rate deadline gate plus an
 *  adaptive wrapper that backs the rate off when compositing a full
 *  frame starts eating the whole budget.
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
use std::time::{Duration, Instant};

use crate::constants::{PACER_EMA_ALPHA, PACER_HEADROOM, PACER_MIN_FPS};

pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        let frame = Duration::from_micros((1_000_000u32 / target_fps.max(1)) as u64);
        Self { next_deadline: Instant::now(), frame }
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.frame = Duration::from_micros((1_000_000u32 / fps.max(1)) as u64);
    }

    /// Returns true if a frame is due now; if true, it also schedules the next deadline.
    #[inline]
    pub fn should_flush(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.next_deadline {
            self.next_deadline = now + self.frame;
            true
        } else {
            false
        }
    }
}

/// Pacer that re-targets itself from measured frame times. The EMA of
/// the compositing+present cost, padded by [`PACER_HEADROOM`], sets the
/// rate the loop can actually sustain, clamped between
/// [`PACER_MIN_FPS`] and the configured cap.
pub struct AutoPacer {
    pacer: Pacer,
    ema_ms: f32,
    max_fps: u32,
    target_fps: u32,
}

impl AutoPacer {
    pub fn new(initial_fps: u32, max_fps: u32) -> Self {
        Self {
            pacer: Pacer::new(initial_fps),
            ema_ms: 0.0,
            max_fps,
            target_fps: initial_fps,
        }
    }

    pub fn should_flush(&mut self) -> bool {
        self.pacer.should_flush()
    }

    /// Rate the pacer currently aims for.
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Call immediately after a composited+presented frame.
    pub fn record_frame_ms(&mut self, frame_ms: f32) {
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            PACER_EMA_ALPHA * frame_ms + (1.0 - PACER_EMA_ALPHA) * self.ema_ms
        };
        if self.ema_ms > 0.0 {
            let safe_fps = (1000.0 / (self.ema_ms * PACER_HEADROOM))
                .clamp(PACER_MIN_FPS as f32, self.max_fps as f32) as u32;
            self.target_fps = safe_fps;
            self.pacer.set_fps(safe_fps);
        }
    }
}
