/*
 *  render.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Frame loop: snapshots the shared histogram once per frame, composites
 *  the waterfall, drives the viewport controller and hands the raster to
 *  the presentation layer.
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

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use crate::histogram::{HistogramStore, SharedHistogram};
use crate::pacer::AutoPacer;
use crate::raster::Raster;
use crate::viewport::{InputEvent, Viewport};
use crate::waterfall;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("presenter error: {0}")]
    Present(String),
}

/// Seam to the external presentation/input layer. The loop owns what to
/// draw; the presenter owns how pixels reach a display and where input
/// events come from.
pub trait Presenter {
    fn present(&mut self, raster: &Raster) -> Result<(), RenderError>;
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Presenter that discards frames; used for headless runs, CI and tests.
/// Optionally quits after a fixed number of presented frames and can
/// replay a scripted event sequence.
pub struct HeadlessPresenter {
    frames_left: Option<u64>,
    script: Vec<InputEvent>,
    presented: u64,
}

impl HeadlessPresenter {
    pub fn new(max_frames: Option<u64>) -> Self {
        Self { frames_left: max_frames, script: Vec::new(), presented: 0 }
    }

    pub fn with_script(max_frames: Option<u64>, mut script: Vec<InputEvent>) -> Self {
        script.reverse(); // pop from the back in order
        Self { frames_left: max_frames, script, presented: 0 }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, _raster: &Raster) -> Result<(), RenderError> {
        self.presented += 1;
        Ok(())
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        if let Some(ev) = self.script.pop() {
            return Some(ev);
        }
        match self.frames_left.as_mut() {
            Some(0) => Some(InputEvent::Quit),
            Some(n) => {
                *n -= 1;
                None
            }
            None => None,
        }
    }
}

/// The render actor. Reads happen on a per-frame snapshot taken under the
/// histogram lock, so compositing itself never contends with ingestion.
pub struct RenderLoop<P: Presenter> {
    shared: SharedHistogram,
    presenter: P,
    viewport: Viewport,
    raster: Raster,
    pacer: AutoPacer,
    snapshot: HistogramStore,
    stop: Arc<AtomicBool>,
}

impl<P: Presenter> RenderLoop<P> {
    pub fn new(
        shared: SharedHistogram,
        presenter: P,
        width: u32,
        height: u32,
        fps: u32,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let snapshot = shared.snapshot();
        Self {
            shared,
            presenter,
            viewport: Viewport::new(width),
            raster: Raster::new(width, height),
            pacer: AutoPacer::new(fps, fps),
            snapshot,
            stop,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Run until quit (event or shutdown flag). Ingestion simply stopping
    /// is not a reason to exit; the last aggregate stays on screen.
    pub fn run(&mut self) -> Result<(), RenderError> {
        info!("Render loop starting at {}x{}", self.raster.width(), self.raster.height());
        let mut change = true;
        let mut highlight_mhz = self.viewport.start_freq_mhz();
        let mut frames: u64 = 0;

        while !self.stop.load(Ordering::Relaxed) {
            if !self.pacer.should_flush() {
                std::thread::sleep(Duration::from_millis(1));
                continue;
            }
            let frame_started = Instant::now();

            // one lock round-trip per frame; compositing reads the clone
            if let Some(snap) = self.shared.frame_snapshot() {
                self.snapshot = snap;
                change = true;
            }

            if change {
                highlight_mhz = waterfall::draw_frame(
                    &mut self.raster,
                    &self.snapshot,
                    self.viewport.start_freq_mhz(),
                );
                change = false;
            }
            self.presenter.present(&self.raster)?;
            frames += 1;

            while let Some(event) = self.presenter.poll_event() {
                if event == InputEvent::Quit {
                    info!("Quit requested after {} frames", frames);
                    return Ok(());
                }
                self.viewport.handle_event(event);
                change = true;
            }

            self.viewport.auto_track(highlight_mhz);
            if self.viewport.step() {
                change = true;
            }

            let frame_ms = frame_started.elapsed().as_secs_f32() * 1000.0;
            self.pacer.record_frame_ms(frame_ms);
            if frames % 512 == 0 {
                debug!(
                    "frame {}: start {} MHz, accel {}, {:.2} ms, pacing {} fps",
                    frames,
                    self.viewport.start_freq_mhz(),
                    self.viewport.accel(),
                    frame_ms,
                    self.pacer.target_fps()
                );
            }
        }
        info!("Render loop stopping on shutdown request ({} frames)", frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HISTORY_DEPTH, RASTER_HEIGHT, RASTER_WIDTH};
    use crate::ingest::{ScanEntry, SubSample, ingest_entry};

    fn stopless() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_loop_quits_on_event() {
        let shared = SharedHistogram::new(HISTORY_DEPTH);
        let presenter = HeadlessPresenter::new(Some(3));
        let mut render = RenderLoop::new(
            shared,
            presenter,
            RASTER_WIDTH,
            RASTER_HEIGHT,
            240,
            stopless(),
        );
        render.run().unwrap();
    }

    #[test]
    fn test_scripted_events_reach_viewport() {
        let shared = SharedHistogram::new(HISTORY_DEPTH);
        ingest_entry(
            &shared,
            &ScanEntry {
                freq_mhz: 2412,
                samples: vec![SubSample { offset_khz: 0, signal_dbm: -50 }],
            },
        );
        let presenter = HeadlessPresenter::with_script(
            Some(4),
            vec![InputEvent::JumpEnd],
        );
        let mut render = RenderLoop::new(
            shared,
            presenter,
            RASTER_WIDTH,
            RASTER_HEIGHT,
            240,
            stopless(),
        );
        render.run().unwrap();
        let vp = render.viewport();
        // jumped to the band tail, then tracking was free to ease back
        assert!(vp.start_freq_mhz() > 5000);
    }
}
