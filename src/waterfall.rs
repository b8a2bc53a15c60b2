/*
 *  waterfall.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Coordinate mapping and compositing: rasterizes the aggregated
 *  histogram into a scrolling heat-map with a max-hold trace on top.
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

use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
};

use crate::constants::*;
use crate::histogram::HistogramStore;
use crate::raster::Raster;

/// Signal strength to raster row. 0 dBm sits near the top of the plotted
/// region, the noise floor toward the bottom.
#[inline]
pub fn dbm_to_y(dbm: i16) -> i32 {
    BASELINE_Y - (Y_OFFSET + Y_SCALE * dbm as i32)
}

/// Frequency (kHz) to raster column for a viewport starting at
/// `start_freq_mhz`.
#[inline]
pub fn khz_to_x(freq_khz: i64, start_freq_mhz: i32) -> i32 {
    ((X_SCALE as i64 * (freq_khz - start_freq_mhz as i64 * 1000)) / 1000) as i32
}

fn draw_grid(raster: &mut Raster, start_freq_mhz: i32) {
    let w = raster.width() as i32;
    let h = raster.height() as i32;
    let grid = PrimitiveStyle::with_stroke(GRID_COLOR, 1);
    let label = MonoTextStyle::new(&FONT_6X10, LABEL_COLOR);

    // vertical lines (frequency)
    let mut mhz = BAND_START_MHZ;
    while mhz < BAND_END_MHZ {
        let x = X_SCALE * (mhz - start_freq_mhz);
        if x >= 0 && x < w {
            Line::new(Point::new(x, 0), Point::new(x, h - LABEL_MARGIN_Y - 1))
                .into_styled(grid)
                .draw(raster)
                .ok();
            Text::with_baseline(
                &format!("{} MHz", mhz),
                Point::new(x - 30, h - LABEL_MARGIN_Y),
                label,
                Baseline::Top,
            )
            .draw(raster)
            .ok();
        }
        mhz += GRID_FREQ_STEP_MHZ;
    }

    // horizontal lines (dBm)
    let mut dbm = GRID_DBM_FLOOR;
    while dbm < 0 {
        let y = dbm_to_y(dbm as i16);
        if y >= 0 && y < h {
            Line::new(Point::new(0, y), Point::new(w - 1, y))
                .into_styled(grid)
                .draw(raster)
                .ok();
            Text::with_baseline(
                &format!("{} dBm", dbm),
                Point::new(5, y - 15),
                label,
                Baseline::Top,
            )
            .draw(raster)
            .ok();
        }
        dbm += GRID_DBM_STEP;
    }
}

/// Composite one frame: grid first, then the rolling-history heat-map,
/// then the max-hold trace so it stays crisp on top.
///
/// The domain is walked at the bin resolution (250 kHz) rather than per
/// pixel column; several domain samples landing on the same column is
/// what builds up the heat-map density.
///
/// Returns the frequency to treat as highlighted this frame, a fixed
/// small offset from the viewport's left edge.
pub fn draw_frame(raster: &mut Raster, store: &HistogramStore, start_freq_mhz: i32) -> i32 {
    raster.clear_color(Rgb888::BLACK);
    draw_grid(raster, start_freq_mhz);

    let w = raster.width() as i32;

    // only the visible slice of the band can produce on-raster columns
    let view_khz = start_freq_mhz as i64 * 1000;
    let first_khz = view_khz.max(BAND_START_MHZ as i64 * 1000);
    let last_khz = (view_khz + (w as i64 * 1000) / X_SCALE as i64 + 1000)
        .min(BAND_END_MHZ as i64 * 1000);

    let mut freq_khz = first_khz;
    while freq_khz < last_khz {
        let x = khz_to_x(freq_khz, start_freq_mhz);
        if x >= 0 && x < w {
            if let Some(history) = store.fetch_history(freq_khz) {
                for sample in history.iter().flatten() {
                    raster.blend_block(x, dbm_to_y(*sample), HISTORY_COLOR, HISTORY_OPACITY);
                }
            }
            if let Some(max) = store.fetch_max(freq_khz) {
                raster.blend_block(x, dbm_to_y(max), MAX_HOLD_COLOR, MAX_HOLD_OPACITY);
            }
        }
        freq_khz += BIN_KHZ as i64;
    }

    start_freq_mhz + HIGHLIGHT_OFFSET_MHZ
}
