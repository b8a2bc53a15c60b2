/*
 *  main.rs
 *
 *  spectramon - spectral scan waterfall
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

use anyhow::Context;
use env_logger::Env;
use log::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use spectramon::config;
use spectramon::ingest::{SyntheticSource, run_ingestion};
use spectramon::render::{HeadlessPresenter, RenderLoop};
use spectramon::SharedHistogram;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Wait for SIGINT, SIGTERM or SIGHUP and raise the shared stop flag so
/// both actors wind down.
#[cfg(unix)]
async fn watch_signals(stop: Arc<AtomicBool>) {
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            warn!("SIGINT handler unavailable: {}", e);
            return;
        }
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("SIGTERM handler unavailable: {}", e);
            return;
        }
    };
    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!("SIGHUP handler unavailable: {}", e);
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => info!("Caught SIGINT, shutting down"),
        _ = sigterm.recv() => info!("Caught SIGTERM, shutting down"),
        _ = sighup.recv() => info!("Caught SIGHUP, shutting down"),
    }
    stop.store(true, Ordering::Relaxed);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    let log_level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("spectramon starting (built {})", BUILD_DATE);
    info!(
        "raster {}x{}, {} fps, history depth {}",
        cfg.raster_width(),
        cfg.raster_height(),
        cfg.fps(),
        cfg.history_depth()
    );

    let stop = Arc::new(AtomicBool::new(false));
    let shared = SharedHistogram::new(cfg.history_depth());

    #[cfg(unix)]
    tokio::spawn(watch_signals(stop.clone()));

    // ingestion actor: drains the capture source into the histogram
    let source = Box::new(SyntheticSource::new(cfg.entries(), Duration::from_millis(2)));
    let ingest_handle = {
        let shared = shared.clone();
        let stop = stop.clone();
        tokio::task::spawn_blocking(move || run_ingestion(source, shared, stop))
    };

    // render actor: frame loop on its own blocking thread
    let render_handle = {
        let presenter = HeadlessPresenter::new(cfg.frames);
        let mut render = RenderLoop::new(
            shared,
            presenter,
            cfg.raster_width(),
            cfg.raster_height(),
            cfg.fps(),
            stop.clone(),
        );
        tokio::task::spawn_blocking(move || render.run())
    };

    let render_result = render_handle.await.context("render task panicked")?;
    // render loop exiting means we are done; release the ingestion actor too
    stop.store(true, Ordering::Relaxed);

    if let Err(e) = ingest_handle.await {
        error!("Ingestion task panicked: {}", e);
    }
    render_result.context("render loop failed")?;

    info!("spectramon done");
    Ok(())
}
