//! Iterative in-place radix-2 FFT.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// Forward DFT of `buffer`, computed in place.
///
/// The length must be a power of two.
pub(crate) fn fft_in_place(buffer: &mut [Complex<f32>]) {
    transform(buffer, false);
}

/// Inverse DFT of `buffer`, computed in place and scaled by `1/n`.
#[cfg(test)]
pub(crate) fn ifft_in_place(buffer: &mut [Complex<f32>]) {
    transform(buffer, true);
    let scale = 1.0 / buffer.len() as f32;
    for value in buffer.iter_mut() {
        *value *= scale;
    }
}

fn transform(buffer: &mut [Complex<f32>], inverse: bool) {
    let n = buffer.len();
    assert!(n.is_power_of_two(), "FFT size must be a power of 2, got {}", n);
    if n < 2 {
        return;
    }

    bit_reverse(buffer);

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = 2.0 * PI / size as f64;
        for start in (0..n).step_by(size) {
            for k in 0..half {
                let angle = step * k as f64;
                let twiddle = Complex::new(angle.cos() as f32, (sign * angle.sin()) as f32);
                let j = start + k;
                let l = j + half;
                let t = twiddle * buffer[l];
                let u = buffer[j];
                buffer[j] = u + t;
                buffer[l] = u - t;
            }
        }
        size <<= 1;
    }
}

fn bit_reverse(buffer: &mut [Complex<f32>]) {
    let n = buffer.len();
    let mut j = 0;
    for i in 0..n {
        if i < j {
            buffer.swap(i, j);
        }
        let mut m = n >> 1;
        while m >= 1 && j >= m {
            j -= m;
            m >>= 1;
        }
        j += m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;

    fn pseudo_random(n: usize, seed: u32) -> Vec<f32> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
            })
            .collect()
    }

    #[test]
    fn sine_at_bin_frequency_peaks_at_that_bin() {
        let n = 64;
        let bin = 5;
        let mut buffer: Vec<Complex<f32>> = (0..n)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * bin as f32 * i as f32 / n as f32;
                Complex::new(phase.sin(), 0.0)
            })
            .collect();
        fft_in_place(&mut buffer);

        let mags: Vec<f32> = buffer[..n / 2].iter().map(|c| c.norm()).collect();
        let (peak, peak_mag) = mags
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        assert_eq!(peak, bin);
        assert!((peak_mag - n as f32 / 2.0).abs() < 1e-3);
        for (i, &m) in mags.iter().enumerate() {
            if i != bin {
                assert!(m < 1e-3, "bin {} leaked {}", i, m);
            }
        }
    }

    #[test]
    fn matches_rustfft() {
        let n = 256;
        let signal = pseudo_random(n, 7);
        let mut ours: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
        let mut reference = ours.clone();

        fft_in_place(&mut ours);
        FftPlanner::<f32>::new().plan_fft_forward(n).process(&mut reference);

        for (a, b) in ours.iter().zip(reference.iter()) {
            assert!((a - b).norm() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn inverse_round_trip() {
        let n = 512;
        let signal = pseudo_random(n, 42);
        let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();

        fft_in_place(&mut buffer);
        ifft_in_place(&mut buffer);

        for (orig, back) in signal.iter().zip(buffer.iter()) {
            assert!((orig - back.re).abs() < 1e-5);
            assert!(back.im.abs() < 1e-5);
        }
    }

    #[test]
    fn impulse_is_flat() {
        let mut buffer = vec![Complex::new(0.0f32, 0.0); 16];
        buffer[0] = Complex::new(1.0, 0.0);
        fft_in_place(&mut buffer);
        for c in &buffer {
            assert!((c.re - 1.0).abs() < 1e-6 && c.im.abs() < 1e-6);
        }
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn rejects_non_power_of_two() {
        let mut buffer = vec![Complex::new(0.0f32, 0.0); 12];
        fft_in_place(&mut buffer);
    }
}
