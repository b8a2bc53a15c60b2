/*
 *  histogram.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Frequency-binned signal histogram: rolling history plus max-hold per
 *  250 kHz bin across the 2300-6000 MHz band.
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

use std::sync::{Arc, Mutex};

use crate::constants::{BAND_START_MHZ, BIN_COUNT, BIN_KHZ};

/// Map an absolute frequency in kHz to its bin index.
///
/// Returns `None` for anything outside the surveyed band, so callers can
/// never index the table with an unchecked frequency.
#[inline]
pub fn freq_khz_to_bin(freq_khz: i64) -> Option<usize> {
    let start_khz = BAND_START_MHZ as i64 * 1000;
    if freq_khz < start_khz {
        return None;
    }
    let bin = ((freq_khz - start_khz) / BIN_KHZ as i64) as usize;
    if bin < BIN_COUNT { Some(bin) } else { None }
}

/// One bin's worth of state.
///
/// History slots hold `None` until a sample lands there; an explicit
/// sentinel rather than overloading 0 dBm as "empty".
#[derive(Debug, Clone)]
struct Bin {
    history: Vec<Option<i16>>,
    cursor: usize,
    max_hold: Option<i16>,
}

impl Bin {
    fn new(depth: usize) -> Self {
        Self {
            history: vec![None; depth],
            cursor: 0,
            max_hold: None,
        }
    }

    /// Ring-buffer write: the slot under the cursor is the oldest and is
    /// evicted first.
    fn record(&mut self, dbm: i16) {
        self.history[self.cursor] = Some(dbm);
        self.cursor = (self.cursor + 1) % self.history.len();
        self.max_hold = Some(match self.max_hold {
            Some(m) => m.max(dbm),
            None => dbm,
        });
    }

    fn clear(&mut self) {
        self.history.fill(None);
        self.cursor = 0;
        self.max_hold = None;
    }
}

/// The histogram table. One instance lives for the whole run, wrapped in
/// [`SharedHistogram`] to cross the ingestion/render thread boundary.
#[derive(Debug, Clone)]
pub struct HistogramStore {
    bins: Vec<Bin>,
    depth: usize,
}

impl HistogramStore {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            bins: (0..BIN_COUNT).map(|_| Bin::new(depth)).collect(),
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Record one signal sample at the given absolute frequency.
    /// Out-of-band frequencies are dropped silently.
    pub fn record_khz(&mut self, freq_khz: i64, dbm: i16) {
        if let Some(bin) = freq_khz_to_bin(freq_khz) {
            self.bins[bin].record(dbm);
        }
    }

    /// Rolling history for the bin nearest `freq_khz`, oldest-first is not
    /// guaranteed; slots are a ring and `None` marks "no sample yet".
    /// Out-of-band frequencies yield `None` ("no data for this column").
    pub fn fetch_history(&self, freq_khz: i64) -> Option<&[Option<i16>]> {
        freq_khz_to_bin(freq_khz).map(|bin| self.bins[bin].history.as_slice())
    }

    /// Max-hold for the bin nearest `freq_khz`; monotonically
    /// non-decreasing across the run until [`reset`](Self::reset).
    pub fn fetch_max(&self, freq_khz: i64) -> Option<i16> {
        freq_khz_to_bin(freq_khz).and_then(|bin| self.bins[bin].max_hold)
    }

    /// Clear all history and max-hold state.
    pub fn reset(&mut self) {
        for bin in &mut self.bins {
            bin.clear();
        }
    }
}

/// Histogram plus its "data changed" flag behind the single mutation lock.
///
/// Writers (the ingestion actor) hold the lock for a whole scan-entry
/// batch; the renderer takes a clone of the table under the same lock once
/// per frame and composites from the clone lock-free. A reader can never
/// observe a half-ingested batch.
#[derive(Clone)]
pub struct SharedHistogram {
    inner: Arc<Mutex<Locked>>,
}

struct Locked {
    store: HistogramStore,
    changed: bool,
}

impl SharedHistogram {
    pub fn new(depth: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Locked {
                store: HistogramStore::new(depth),
                changed: false,
            })),
        }
    }

    /// Run one ingestion batch under the lock and flag the change.
    /// `f` gets the store exactly once; all its writes become visible to
    /// the renderer atomically.
    pub fn ingest_batch<F>(&self, f: F)
    where
        F: FnOnce(&mut HistogramStore),
    {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard.store);
        guard.changed = true;
    }

    /// Per-frame read path: if anything changed since the last call,
    /// clear the flag and hand back a snapshot of the table. `None` means
    /// the previous snapshot is still current.
    pub fn frame_snapshot(&self) -> Option<HistogramStore> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.changed {
            guard.changed = false;
            Some(guard.store.clone())
        } else {
            None
        }
    }

    /// Unconditional snapshot, flag untouched.
    pub fn snapshot(&self) -> HistogramStore {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.store.clone()
    }
}
