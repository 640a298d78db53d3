use rustfft::num_complex::Complex;
use serde::Serialize;
use std::borrow::Cow;
use std::f32::consts::PI;

use super::fft::fft_in_place;

/// Added to normalized magnitudes before the log so silent bins stay finite.
const MAGNITUDE_EPSILON: f32 = 1e-12;

/// Log-magnitude spectrogram, one row of `bins` decibel values per frame.
#[derive(Clone, Debug, Serialize)]
pub struct Spectrogram {
    frames: Vec<Vec<f32>>,
    bins: usize,
    hop_size: usize,
    sample_rate: f32,
}

impl Spectrogram {
    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bins per frame (half the FFT length).
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Sample rate of the signal after decimation.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn seconds_per_frame(&self) -> f32 {
        self.hop_size as f32 / self.sample_rate
    }

    /// Center frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / (2 * self.bins) as f32
    }
}

/// Strided decimation: keeps every `floor(source_rate / target_rate)`-th sample.
///
/// No anti-aliasing filter is applied. Returns the samples and their new rate;
/// signals already at or below the target pass through untouched.
pub(crate) fn decimate(samples: &[f32], source_rate: u32, target_rate: u32) -> (Cow<'_, [f32]>, f32) {
    if source_rate <= target_rate {
        return (Cow::Borrowed(samples), source_rate as f32);
    }

    let factor = (source_rate / target_rate) as usize;
    let out_len = samples.len() / factor;
    let decimated: Vec<f32> = samples.iter().step_by(factor).take(out_len).copied().collect();

    (Cow::Owned(decimated), source_rate as f32 / factor as f32)
}

pub(crate) fn hann_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

/// Short-time Fourier transform with a fixed Hann window.
#[derive(Clone, Debug)]
pub(crate) struct Stft {
    frame_size: usize,
    fft_size: usize,
    hop_size: usize,
    window: Vec<f32>,
}

impl Stft {
    /// `fft_size` must be a power of two no smaller than `frame_size`; the
    /// windowed frame is zero-padded up to it.
    pub(crate) fn new(frame_size: usize, fft_size: usize, hop_size: usize) -> Self {
        assert!(fft_size.is_power_of_two() && fft_size >= frame_size);
        assert!(hop_size > 0, "hop size must be greater than zero");
        Self {
            frame_size,
            fft_size,
            hop_size,
            window: hann_window(frame_size),
        }
    }

    pub(crate) fn frame_count(&self, signal_len: usize) -> usize {
        if signal_len < self.frame_size {
            0
        } else {
            1 + (signal_len - self.frame_size) / self.hop_size
        }
    }

    pub(crate) fn transform(&self, signal: &[f32], sample_rate: f32) -> Spectrogram {
        let bins = self.fft_size / 2;
        let frame_count = self.frame_count(signal.len());
        let mut frames = Vec::with_capacity(frame_count);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];

        for t in 0..frame_count {
            let start = t * self.hop_size;
            for (n, slot) in buffer.iter_mut().enumerate() {
                let sample = if n < self.frame_size {
                    signal.get(start + n).copied().unwrap_or(0.0) * self.window[n]
                } else {
                    0.0
                };
                *slot = Complex::new(sample, 0.0);
            }

            fft_in_place(&mut buffer);

            let row: Vec<f32> = buffer[..bins]
                .iter()
                .map(|c| 20.0 * (c.norm() / bins as f32 + MAGNITUDE_EPSILON).log10())
                .collect();
            frames.push(row);
        }

        Spectrogram {
            frames,
            bins,
            hop_size: self.hop_size,
            sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn decimate_keeps_every_nth_sample() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let (out, rate) = decimate(&samples, 44_100, 11_025);
        assert_eq!(out.as_ref(), &[0.0, 4.0]);
        assert_eq!(rate, 11_025.0);
    }

    #[test]
    fn decimate_floors_the_factor() {
        let samples: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let (out, rate) = decimate(&samples, 48_000, 11_025);
        assert_eq!(out.as_ref(), &[0.0, 4.0, 8.0]);
        assert_eq!(rate, 12_000.0);
    }

    #[test]
    fn decimate_passes_through_low_rates() {
        let samples = vec![1.0, 2.0, 3.0];
        let (out, rate) = decimate(&samples, 8_000, 11_025);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(rate, 8_000.0);
    }

    #[test]
    fn hann_tapers_to_zero() {
        let w = hann_window(8);
        assert!(w[0].abs() < 1e-6);
        assert!(w[7].abs() < 1e-6);
        assert!(w.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn frame_count_follows_hop() {
        let stft = Stft::new(2048, 2048, 1024);
        assert_eq!(stft.frame_count(2047), 0);
        assert_eq!(stft.frame_count(2048), 1);
        assert_eq!(stft.frame_count(3071), 1);
        assert_eq!(stft.frame_count(3072), 2);
        assert_eq!(stft.frame_count(11_025), 9);
    }

    #[test]
    fn short_signal_yields_empty_spectrogram() {
        let stft = Stft::new(2048, 2048, 1024);
        let spec = stft.transform(&vec![0.1; 100], 11_025.0);
        assert!(spec.is_empty());
        assert_eq!(spec.bins(), 1024);
    }

    #[test]
    fn tone_peaks_at_expected_bin() {
        let rate = 11_025;
        let stft = Stft::new(2048, 2048, 1024);
        // Exactly bin 100.
        let freq = 100.0 * rate as f32 / 2048.0;
        let spec = stft.transform(&tone(freq, rate, 8192), rate as f32);

        assert_eq!(spec.len(), 7);
        for row in spec.frames() {
            assert_eq!(row.len(), 1024);
            let peak = row
                .iter()
                .enumerate()
                .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
            assert_eq!(peak.0, 100);
            assert!(peak.1 > -20.0 && peak.1 < 0.0);
        }
        assert!((spec.bin_frequency(100) - freq).abs() < 1e-2);
    }

    #[test]
    fn silence_is_floored_not_infinite() {
        let stft = Stft::new(256, 256, 128);
        let spec = stft.transform(&vec![0.0; 512], 11_025.0);
        for row in spec.frames() {
            for &v in row {
                assert!(v.is_finite());
                assert!((v - (-240.0)).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn zero_pads_frames_to_fft_size() {
        let stft = Stft::new(1000, 1024, 500);
        let spec = stft.transform(&tone(440.0, 11_025, 3000), 11_025.0);
        assert_eq!(spec.len(), 5);
        assert_eq!(spec.bins(), 512);
    }

    #[test]
    #[should_panic(expected = "hop size")]
    fn rejects_zero_hop() {
        Stft::new(256, 256, 0);
    }
}
