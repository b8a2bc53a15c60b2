/*
 *  tests/pipeline.rs
 *
 *  Integration tests for the ingestion/render pipeline, in particular
 *  the batch-atomicity contract of the shared histogram.
 *
 *  spectramon - spectral scan waterfall
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use spectramon::constants::HISTORY_DEPTH;
use spectramon::ingest::{ScanEntry, SubSample, ingest_entry, run_ingestion};
use spectramon::render::{HeadlessPresenter, RenderLoop};
use spectramon::{SharedHistogram, SyntheticSource};

const SUB_BINS: i32 = 15;
const CENTER_MHZ: i32 = 2412;

fn batch(value: i16) -> ScanEntry {
    ScanEntry {
        freq_mhz: CENTER_MHZ,
        samples: (0..SUB_BINS)
            .map(|i| SubSample { offset_khz: i * 250, signal_dbm: value })
            .collect(),
    }
}

/// Every batch writes one strictly increasing value to all of its bins,
/// so max-hold equals the latest batch value. A reader snapshot must see
/// the same max on every covered bin; a mismatch would mean it observed a
/// batch half-applied.
#[test]
fn test_reader_never_sees_partial_batch() {
    let shared = SharedHistogram::new(HISTORY_DEPTH);
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let shared = shared.clone();
        let done = done.clone();
        thread::spawn(move || {
            for i in 1..=2000i16 {
                ingest_entry(&shared, &batch(-2100 + i));
            }
            done.store(true, Ordering::Release);
        })
    };

    let reader = {
        let shared = shared.clone();
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                let snap = shared.snapshot();
                let maxes: Vec<Option<i16>> = (0..SUB_BINS)
                    .map(|i| snap.fetch_max(CENTER_MHZ as i64 * 1000 + (i * 250) as i64))
                    .collect();
                let first = maxes[0];
                assert!(
                    maxes.iter().all(|m| *m == first),
                    "partial batch visible: {:?}",
                    maxes
                );
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    // final state: max-hold is the last (largest) batch value everywhere
    let snap = shared.snapshot();
    for i in 0..SUB_BINS {
        let khz = CENTER_MHZ as i64 * 1000 + (i * 250) as i64;
        assert_eq!(snap.fetch_max(khz), Some(-100));
    }
}

/// Changed-flag handshake across threads: the renderer's per-frame
/// snapshot picks up each batch exactly once.
#[test]
fn test_frame_snapshot_consumes_change_flag() {
    let shared = SharedHistogram::new(HISTORY_DEPTH);
    ingest_entry(&shared, &batch(-60));

    assert!(shared.frame_snapshot().is_some());
    assert!(shared.frame_snapshot().is_none());

    ingest_entry(&shared, &batch(-50));
    let snap = shared.frame_snapshot().expect("second batch flagged");
    assert_eq!(snap.fetch_max(CENTER_MHZ as i64 * 1000), Some(-50));
}

/// Full pipeline: synthetic capture draining on one actor while the
/// render loop runs a bounded number of headless frames on another.
#[test]
fn test_pipeline_runs_to_completion() {
    let shared = SharedHistogram::new(HISTORY_DEPTH);
    let stop = Arc::new(AtomicBool::new(false));

    let ingest = {
        let shared = shared.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let source = Box::new(SyntheticSource::with_seed(512, 42));
            run_ingestion(source, shared, stop);
        })
    };

    let mut render = RenderLoop::new(
        shared.clone(),
        HeadlessPresenter::new(Some(20)),
        800,
        650,
        240,
        stop.clone(),
    );
    render.run().unwrap();

    ingest.join().unwrap();

    // the capture left data behind and it survived the render loop
    let snap = shared.snapshot();
    let populated = (2_300_000i64..6_000_000)
        .step_by(250)
        .filter(|khz| snap.fetch_max(*khz).is_some())
        .count();
    assert!(populated > 0, "synthetic capture produced no in-band bins");
}
