//! Audio fingerprinting pipeline.
//!
//! Decimation, STFT, peak picking and landmark hashing, composed behind
//! [`Fingerprinter`]. Every stage is a pure function of its input and the
//! validated configuration.

pub(crate) mod fft;
pub(crate) mod hashing;
pub(crate) mod peaks;
pub(crate) mod spectrogram;

use crate::config::FingerprintConfig;
use crate::error::{ConfigError, RecognizerError, Result};

use hashing::{hash_landmarks, Fingerprint, MAX_TOKEN_BIN, MAX_TOKEN_DELTA};
use peaks::extract_peaks;
use spectrogram::{decimate, Spectrogram, Stft};

/// Validated fingerprint parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FingerprintParams {
    pub target_sample_rate: u32,
    pub frame_size: usize,
    pub fft_size: usize,
    pub hop_size: usize,
    pub peaks_per_frame: usize,
    pub min_magnitude_db: f32,
    pub fan_out: usize,
    pub min_frame_delta: usize,
    pub max_frame_delta: usize,
}

impl TryFrom<&FingerprintConfig> for FingerprintParams {
    type Error = ConfigError;

    fn try_from(config: &FingerprintConfig) -> std::result::Result<Self, ConfigError> {
        if config.frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        let fft_size = config
            .frame_size
            .checked_next_power_of_two()
            .filter(|&n| n / 2 <= MAX_TOKEN_BIN + 1)
            .ok_or(ConfigError::FrameSizeTooLarge(config.frame_size))?;

        let hop_size = config.hop_size.unwrap_or((config.frame_size / 2).max(1));
        if hop_size == 0 {
            return Err(ConfigError::ZeroHopSize);
        }
        if config.target_sample_rate == 0 {
            return Err(ConfigError::ZeroTargetRate);
        }
        if config.peaks_per_frame == 0 {
            return Err(ConfigError::ZeroPeakCap);
        }
        if config.fan_out == 0 {
            return Err(ConfigError::ZeroFanOut);
        }
        if config.min_frame_delta == 0 {
            return Err(ConfigError::ZeroMinFrameDelta);
        }
        if config.min_frame_delta > config.max_frame_delta {
            return Err(ConfigError::FrameDeltaRange {
                min: config.min_frame_delta,
                max: config.max_frame_delta,
            });
        }
        if config.max_frame_delta > MAX_TOKEN_DELTA {
            return Err(ConfigError::FrameDeltaTooLarge(config.max_frame_delta));
        }

        Ok(Self {
            target_sample_rate: config.target_sample_rate,
            frame_size: config.frame_size,
            fft_size,
            hop_size,
            peaks_per_frame: config.peaks_per_frame,
            min_magnitude_db: config.min_magnitude_db,
            fan_out: config.fan_out,
            min_frame_delta: config.min_frame_delta,
            max_frame_delta: config.max_frame_delta,
        })
    }
}

/// Intermediate products of one fingerprinting run.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub spectrogram: Spectrogram,
    pub peaks: Vec<Vec<usize>>,
    pub fingerprint: Fingerprint,
}

/// Turns mono samples into landmark fingerprints.
#[derive(Clone, Debug)]
pub struct Fingerprinter {
    params: FingerprintParams,
    stft: Stft,
}

impl Fingerprinter {
    pub fn new(config: &FingerprintConfig) -> std::result::Result<Self, ConfigError> {
        let params = FingerprintParams::try_from(config)?;
        if params.fft_size != params.frame_size {
            log::warn!(
                "Frame size {} is not a power of two; zero-padding to {}",
                params.frame_size,
                params.fft_size
            );
        }
        let stft = Stft::new(params.frame_size, params.fft_size, params.hop_size);
        Ok(Self { params, stft })
    }

    pub fn params(&self) -> &FingerprintParams {
        &self.params
    }

    /// Fingerprint of a mono buffer sampled at `sample_rate` Hz.
    pub fn fingerprint(&self, samples: &[f32], sample_rate: u32) -> Result<Fingerprint> {
        Ok(self.analyze(samples, sample_rate)?.fingerprint)
    }

    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<Analysis> {
        if sample_rate == 0 {
            return Err(RecognizerError::InvalidSampleRate);
        }

        let (signal, rate) = decimate(samples, sample_rate, self.params.target_sample_rate);
        let spectrogram = self.stft.transform(&signal, rate);
        let peaks = extract_peaks(
            &spectrogram,
            self.params.peaks_per_frame,
            self.params.min_magnitude_db,
        );
        let fingerprint = hash_landmarks(
            &peaks,
            self.params.fan_out,
            self.params.min_frame_delta,
            self.params.max_frame_delta,
        );

        log::debug!(
            "Fingerprinted {} samples @ {}Hz -> {} frames, {} hashes",
            samples.len(),
            sample_rate,
            spectrogram.len(),
            fingerprint.len()
        );

        Ok(Analysis {
            spectrogram,
            peaks,
            fingerprint,
        })
    }
}
