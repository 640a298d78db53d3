use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// Fingerprinting parameters. Applied as one unit when a
/// [`Fingerprinter`](crate::Fingerprinter) is constructed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FingerprintConfig {
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Defaults to half the frame size when unset.
    #[serde(default)]
    pub hop_size: Option<usize>,
    #[serde(default = "default_peaks_per_frame")]
    pub peaks_per_frame: usize,
    #[serde(default = "default_min_magnitude_db")]
    pub min_magnitude_db: f32,
    #[serde(default = "default_fan_out")]
    pub fan_out: usize,
    #[serde(default = "default_min_frame_delta")]
    pub min_frame_delta: usize,
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Matches with fewer votes are reported as unlikely.
    #[serde(default = "default_min_votes")]
    pub min_votes: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: default_target_sample_rate(),
            frame_size: default_frame_size(),
            hop_size: None,
            peaks_per_frame: default_peaks_per_frame(),
            min_magnitude_db: default_min_magnitude_db(),
            fan_out: default_fan_out(),
            min_frame_delta: default_min_frame_delta(),
            max_frame_delta: default_max_frame_delta(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_votes: default_min_votes(),
        }
    }
}

fn default_target_sample_rate() -> u32 { 11_025 }
fn default_frame_size() -> usize { 2048 }
fn default_peaks_per_frame() -> usize { 5 }
fn default_min_magnitude_db() -> f32 { -60.0 }
fn default_fan_out() -> usize { 5 }
fn default_min_frame_delta() -> usize { 1 }
fn default_max_frame_delta() -> usize { 30 }
fn default_min_votes() -> usize { 5 }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
