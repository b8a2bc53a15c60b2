/*
 *  lib.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Aggregates wireless spectral-scan samples into a frequency-binned
 *  histogram (rolling history + max-hold) and rasterizes it as a
 *  scrolling heat-map with an auto-tracking viewport.
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

pub mod config;
pub mod constants;
pub mod histogram;
pub mod ingest;
pub mod pacer;
pub mod raster;
pub mod render;
pub mod viewport;
pub mod waterfall;

pub use histogram::{HistogramStore, SharedHistogram, freq_khz_to_bin};
pub use ingest::{ScanEntry, ScanSource, SubSample, SyntheticSource, ingest_entry, run_ingestion};
pub use raster::Raster;
pub use render::{HeadlessPresenter, Presenter, RenderLoop};
pub use viewport::{InputEvent, Viewport};
