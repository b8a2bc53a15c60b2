//! Global constants shared by the histogram, compositor and viewport modules.

use embedded_graphics::pixelcolor::Rgb888;

/// Lower edge of the surveyed band in MHz.
pub const BAND_START_MHZ: i32 = 2300;
/// Upper edge of the surveyed band in MHz.
pub const BAND_END_MHZ: i32 = 6000;

/// Width of one histogram bin in kHz.
pub const BIN_KHZ: i32 = 250;
/// Number of bins covering the full band.
pub const BIN_COUNT: usize = ((BAND_END_MHZ - BAND_START_MHZ) * 1000 / BIN_KHZ) as usize;

/// Rolling samples retained per bin.
pub const HISTORY_DEPTH: usize = 10;

/// Default raster dimensions.
pub const RASTER_WIDTH: u32 = 1600;
pub const RASTER_HEIGHT: u32 = 650;

/// Pixels per MHz on the frequency axis.
pub const X_SCALE: i32 = 5;
/// Pixels per dBm on the signal axis.
pub const Y_SCALE: i32 = 4;
/// Signal row mapping: y = BASELINE_Y - (Y_OFFSET + Y_SCALE * dBm).
/// With these values 0 dBm lands at the top of the plotted region and
/// -150 dBm at row 600.
pub const BASELINE_Y: i32 = 400;
pub const Y_OFFSET: i32 = 400;

/// Half-extent of the blended block drawn per sample point.
pub const BLEND_RADIUS: i32 = 2;

/// History points: cool color, low opacity so overlap accumulates.
pub const HISTORY_COLOR: Rgb888 = Rgb888::new(0, 0, 255);
pub const HISTORY_OPACITY: u8 = 64;
/// Max-hold trace: warm color, higher opacity so it reads as a line.
pub const MAX_HOLD_COLOR: Rgb888 = Rgb888::new(255, 0, 0);
pub const MAX_HOLD_OPACITY: u8 = 128;

/// Grid spacing and style.
pub const GRID_FREQ_STEP_MHZ: i32 = 20;
pub const GRID_DBM_STEP: i32 = 10;
pub const GRID_DBM_FLOOR: i32 = -150;
pub const GRID_COLOR: Rgb888 = Rgb888::new(0x40, 0x40, 0x40);
pub const LABEL_COLOR: Rgb888 = Rgb888::new(0xff, 0xff, 0xff);
/// Rows at the bottom of the raster reserved for the frequency labels.
pub const LABEL_MARGIN_Y: i32 = 20;

/// Viewport start frequency at launch.
pub const VIEW_START_MHZ: i32 = 2350;
/// The highlighted frequency sits this far from the viewport's left edge.
pub const HIGHLIGHT_OFFSET_MHZ: i32 = 20;

/// Auto-scroll tuning (MHz margins, per-frame acceleration).
pub const TRACK_MARGIN_MHZ: i32 = 20;
pub const TRACK_ACCEL: i32 = 10;
pub const CATCHUP_MARGIN_MHZ: i32 = 300;
pub const CATCHUP_ACCEL: i32 = 100;
pub const MANUAL_ACCEL_STEP: i32 = 2;
pub const ACCEL_LIMIT: i32 = 20;

/// Default frame rate for the render loop.
pub const DEFAULT_FPS: u32 = 30;

/// Adaptive pacer tuning: EMA smoothing factor for the frame-time
/// average, headroom multiplier so the loop never runs saturated, and
/// the rate floor it may back off to under load.
pub const PACER_EMA_ALPHA: f32 = 0.2;
pub const PACER_HEADROOM: f32 = 1.25;
pub const PACER_MIN_FPS: u32 = 5;
