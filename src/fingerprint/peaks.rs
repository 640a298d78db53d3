use super::spectrogram::Spectrogram;

/// Picks up to `max_peaks` local maxima louder than `min_magnitude_db` from
/// every frame, strongest first.
///
/// Equal magnitudes keep ascending bin order. The edge bins are never peaks.
pub(crate) fn extract_peaks(
    spectrogram: &Spectrogram,
    max_peaks: usize,
    min_magnitude_db: f32,
) -> Vec<Vec<usize>> {
    spectrogram
        .frames()
        .iter()
        .enumerate()
        .map(|(t, row)| {
            let peaks = frame_peaks(row, max_peaks, min_magnitude_db);
            if peaks.is_empty() {
                log::debug!("Frame {}: no peaks above {:.1} dB", t, min_magnitude_db);
            }
            peaks
        })
        .collect()
}

fn frame_peaks(row: &[f32], max_peaks: usize, min_magnitude_db: f32) -> Vec<usize> {
    if row.len() < 3 {
        return Vec::new();
    }

    let mut candidates: Vec<(usize, f32)> = (1..row.len() - 1)
        .filter(|&k| row[k] > min_magnitude_db && row[k] > row[k - 1] && row[k] > row[k + 1])
        .map(|k| (k, row[k]))
        .collect();

    // Stable: ties stay in bin order.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(max_peaks);

    candidates.into_iter().map(|(k, _)| k).collect()
}
