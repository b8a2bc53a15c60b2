use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{DEFAULT_FPS, HISTORY_DEPTH, RASTER_HEIGHT, RASTER_WIDTH};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. All fields optional so YAML and CLI can
/// layer; effective values come from the accessors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub fps: Option<u32>,              // render loop target
    pub history_depth: Option<usize>,  // rolling samples per bin
    /// number of synthetic entries to generate (demo source)
    pub entries: Option<u64>,
    /// stop after this many rendered frames (headless runs)
    pub frames: Option<u64>,
    pub raster: Option<RasterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RasterConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Config {
    pub fn fps(&self) -> u32 { self.fps.unwrap_or(DEFAULT_FPS) }
    pub fn history_depth(&self) -> usize { self.history_depth.unwrap_or(HISTORY_DEPTH) }
    pub fn entries(&self) -> u64 { self.entries.unwrap_or(4096) }
    pub fn raster_width(&self) -> u32 {
        self.raster.as_ref().and_then(|r| r.width).unwrap_or(RASTER_WIDTH)
    }
    pub fn raster_height(&self) -> u32 {
        self.raster.as_ref().and_then(|r| r.height).unwrap_or(RASTER_HEIGHT)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "spectramon", about = "Spectral-scan histogram waterfall", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub fps: Option<u32>,
    #[arg(long)]
    pub history_depth: Option<usize>,
    /// synthetic capture length in scan entries
    #[arg(long)]
    pub entries: Option<u64>,
    /// render this many frames then exit (headless/CI runs)
    #[arg(long)]
    pub frames: Option<u64>,
    #[arg(long)]
    pub raster_width: Option<u32>,
    #[arg(long)]
    pub raster_height: Option<u32>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    load_with(cli)
}

fn load_with(cli: Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/spectramon/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/spectramon/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/spectramon.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["spectramon.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()     { dst.log_level = src.log_level; }
    if src.fps.is_some()           { dst.fps = src.fps; }
    if src.history_depth.is_some() { dst.history_depth = src.history_depth; }
    if src.entries.is_some()       { dst.entries = src.entries; }
    if src.frames.is_some()        { dst.frames = src.frames; }
    match (&mut dst.raster, src.raster) {
        (None, Some(c)) => dst.raster = Some(c),
        (Some(d), Some(s)) => {
            if s.width.is_some()  { d.width = s.width; }
            if s.height.is_some() { d.height = s.height; }
        }
        _ => {}
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()     { cfg.log_level = cli.log_level.clone(); }
    if cli.fps.is_some()           { cfg.fps = cli.fps; }
    if cli.history_depth.is_some() { cfg.history_depth = cli.history_depth; }
    if cli.entries.is_some()       { cfg.entries = cli.entries; }
    if cli.frames.is_some()        { cfg.frames = cli.frames; }

    if (cli.raster_width.is_some() || cli.raster_height.is_some()) && cfg.raster.is_none() {
        cfg.raster = Some(RasterConfig::default());
    }
    if let Some(raster) = cfg.raster.as_mut() {
        if cli.raster_width.is_some()  { raster.width = cli.raster_width; }
        if cli.raster_height.is_some() { raster.height = cli.raster_height; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.raster_width() == 0 || cfg.raster_height() == 0 {
        return Err(ConfigError::Validation("raster width/height must be > 0".into()));
    }
    if let Some(fps) = cfg.fps {
        if fps == 0 || fps > 240 {
            return Err(ConfigError::Validation("fps must be 1..=240".into()));
        }
    }
    if let Some(depth) = cfg.history_depth {
        if depth == 0 {
            return Err(ConfigError::Validation("history_depth must be > 0".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.fps(), DEFAULT_FPS);
        assert_eq!(cfg.history_depth(), HISTORY_DEPTH);
        assert_eq!(cfg.raster_width(), RASTER_WIDTH);
        assert_eq!(cfg.raster_height(), RASTER_HEIGHT);
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_merge_prefers_src_options() {
        let mut dst = Config::default();
        let src = Config {
            fps: Some(60),
            raster: Some(RasterConfig { width: Some(800), height: None }),
            ..Default::default()
        };
        merge(&mut dst, src);
        assert_eq!(dst.fps(), 60);
        assert_eq!(dst.raster_width(), 800);
        assert_eq!(dst.raster_height(), RASTER_HEIGHT);
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let cfg = Config { history_depth: Some(0), ..Default::default() };
        assert!(validate(&cfg).is_err());
    }
}
