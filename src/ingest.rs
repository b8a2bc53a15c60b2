/*
 *  ingest.rs
 *
 *  spectramon - spectral scan waterfall
 *
 *  Ingestion actor: drains decoded scan entries from a ScanSource and
 *  folds them into the shared histogram, one locked batch per entry.
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
use std::time::Duration;

use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::histogram::SharedHistogram;

/// Error type for scan sources. The decoder itself is an external
/// collaborator; these cover the seam only.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decoder error: {0}")]
    Decoder(String),
}

/// One per-sub-band measurement within a scan entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubSample {
    /// Offset from the entry's center frequency, in kHz.
    pub offset_khz: i32,
    /// Signal strength in dBm.
    pub signal_dbm: i16,
}

/// A decoded spectral-scan entry as handed over by the external decoder:
/// a center frequency plus the per-sub-band values derived from one FFT.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub freq_mhz: i32,
    pub samples: Vec<SubSample>,
}

impl ScanEntry {
    /// Absolute frequency of one sub-sample in kHz.
    #[inline]
    pub fn sample_khz(&self, sample: &SubSample) -> i64 {
        self.freq_mhz as i64 * 1000 + sample.offset_khz as i64
    }
}

/// Abstract over where entries come from (capture decoder, live radio,
/// synthetic generator). Yields `Ok(None)` at end of capture.
pub trait ScanSource: Send {
    fn next_entry(&mut self) -> Result<Option<ScanEntry>, IngestError>;
}

/// Fold one entry into the histogram. All sub-samples land under a single
/// lock acquisition so the renderer never sees a half-applied entry.
pub fn ingest_entry(shared: &SharedHistogram, entry: &ScanEntry) {
    shared.ingest_batch(|store| {
        for sample in &entry.samples {
            store.record_khz(entry.sample_khz(sample), sample.signal_dbm);
        }
    });
}

/// Drive a source to completion. Runs on its own actor; a source failure
/// is fatal here only - whatever was already aggregated stays queryable
/// and the render loop keeps going.
pub fn run_ingestion(
    mut source: Box<dyn ScanSource>,
    shared: SharedHistogram,
    stop: Arc<AtomicBool>,
) {
    let mut entries: u64 = 0;
    loop {
        if stop.load(Ordering::Relaxed) {
            info!("Ingestion stopping on shutdown request ({} entries)", entries);
            return;
        }
        match source.next_entry() {
            Ok(Some(entry)) => {
                ingest_entry(&shared, &entry);
                entries += 1;
                if entries % 256 == 0 {
                    debug!("Ingested {} scan entries", entries);
                }
            }
            Ok(None) => {
                info!("Capture exhausted after {} entries", entries);
                return;
            }
            Err(e) => {
                error!("Scan source failed after {} entries: {}", entries, e);
                return;
            }
        }
    }
}

/// Number of sub-bands generated per synthetic entry, matching a 20 MHz
/// HT20 spectral sample.
const SYNTH_SUB_BINS: i32 = 56;
const SYNTH_SUB_SPACING_KHZ: i32 = 357;

/// Synthetic stand-in for a live capture: bursts centered on common
/// 2.4/5 GHz channels with a noisy sinc-ish lobe, useful for demos and
/// for exercising the pipeline without hardware.
pub struct SyntheticSource {
    rng: StdRng,
    remaining: u64,
    pace: Duration,
}

const SYNTH_CENTERS_MHZ: &[i32] = &[2412, 2437, 2462, 5180, 5220, 5500, 5745];

impl SyntheticSource {
    pub fn new(entries: u64, pace: Duration) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            remaining: entries,
            pace,
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(entries: u64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: entries,
            pace: Duration::ZERO,
        }
    }

    fn generate(&mut self) -> ScanEntry {
        let center = SYNTH_CENTERS_MHZ[self.rng.random_range(0..SYNTH_CENTERS_MHZ.len())];
        let peak_dbm: i16 = self.rng.random_range(-70..-30);
        let mut samples = Vec::with_capacity(SYNTH_SUB_BINS as usize);
        for i in 0..SYNTH_SUB_BINS {
            let offset_khz = (i - SYNTH_SUB_BINS / 2) * SYNTH_SUB_SPACING_KHZ;
            // lobe falls off toward the channel edges, plus noise
            let falloff = (offset_khz.abs() / 250) as i16;
            let jitter: i16 = self.rng.random_range(-4..=4);
            let dbm = (peak_dbm - falloff + jitter).max(-120);
            samples.push(SubSample {
                offset_khz,
                signal_dbm: dbm,
            });
        }
        ScanEntry {
            freq_mhz: center,
            samples,
        }
    }
}

impl ScanSource for SyntheticSource {
    fn next_entry(&mut self) -> Result<Option<ScanEntry>, IngestError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        if !self.pace.is_zero() {
            std::thread::sleep(self.pace);
        }
        Ok(Some(self.generate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HISTORY_DEPTH;

    #[test]
    fn test_entry_maps_offsets_to_absolute_khz() {
        let entry = ScanEntry {
            freq_mhz: 2412,
            samples: vec![
                SubSample { offset_khz: -500, signal_dbm: -80 },
                SubSample { offset_khz: 0, signal_dbm: -50 },
                SubSample { offset_khz: 500, signal_dbm: -80 },
            ],
        };
        assert_eq!(entry.sample_khz(&entry.samples[0]), 2_411_500);
        assert_eq!(entry.sample_khz(&entry.samples[1]), 2_412_000);
        assert_eq!(entry.sample_khz(&entry.samples[2]), 2_412_500);
    }

    #[test]
    fn test_ingest_entry_records_and_flags() {
        let shared = SharedHistogram::new(HISTORY_DEPTH);
        let entry = ScanEntry {
            freq_mhz: 2412,
            samples: vec![
                SubSample { offset_khz: 0, signal_dbm: -50 },
                SubSample { offset_khz: 250, signal_dbm: -60 },
            ],
        };
        ingest_entry(&shared, &entry);

        let snap = shared.frame_snapshot().expect("changed flag set");
        assert_eq!(snap.fetch_max(2_412_000), Some(-50));
        assert_eq!(snap.fetch_max(2_412_250), Some(-60));
    }

    #[test]
    fn test_out_of_band_samples_are_dropped() {
        let shared = SharedHistogram::new(HISTORY_DEPTH);
        let entry = ScanEntry {
            freq_mhz: 6000,
            samples: vec![SubSample { offset_khz: 250, signal_dbm: -10 }],
        };
        ingest_entry(&shared, &entry);

        // the batch still flags a change, but nothing was written
        let snap = shared.frame_snapshot().expect("changed flag set");
        assert!(snap.fetch_max(5_999_750).is_none());
    }

    #[test]
    fn test_synthetic_source_stays_in_band() {
        let mut source = SyntheticSource::with_seed(20, 7);
        let mut produced = 0;
        while let Some(entry) = source.next_entry().unwrap() {
            produced += 1;
            for sample in &entry.samples {
                let khz = entry.sample_khz(sample);
                assert!(khz > 2_300_000 && khz < 6_000_000, "sample at {} kHz", khz);
                assert!(sample.signal_dbm >= -120 && sample.signal_dbm < 0);
            }
        }
        assert_eq!(produced, 20);
    }
}
