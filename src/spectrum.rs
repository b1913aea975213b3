use std::ops::Range;

pub const ANALYSIS_BINS: usize = 256;

/// Reduces a frequency buffer to `target` bands by bucketed averaging.
///
/// When `target` is at least the buffer length the buffer is copied as-is;
/// no extra resolution is synthesized.
pub fn sample_bands(buffer: &[u8], target: usize) -> Vec<f32> {
    if target >= buffer.len() {
        return buffer.iter().map(|&value| value as f32).collect();
    }
    band_ranges(buffer.len(), target)
        .map(|range| {
            let count = range.len();
            if count == 0 {
                return 0.0;
            }
            let sum: u32 = buffer[range].iter().map(|&value| value as u32).sum();
            sum as f32 / count as f32
        })
        .collect()
}

/// Source index range averaged by each band when `target < len`.
///
/// Uneven bucket sizes for non-integer ratios are expected.
pub fn band_ranges(len: usize, target: usize) -> impl Iterator<Item = Range<usize>> {
    // floor(i * len / target) in integers, so the last bucket always ends at `len`.
    let target = target.max(1);
    (0..target).map(move |index| {
        let start = (index * len / target).min(len);
        let end = ((index + 1) * len / target).min(len);
        start..end.max(start)
    })
}

pub fn is_silent(bands: &[f32]) -> bool {
    bands.iter().all(|&value| value == 0.0)
}

pub fn average(bands: &[f32]) -> f32 {
    if bands.is_empty() {
        return 0.0;
    }
    bands.iter().sum::<f32>() / bands.len() as f32
}
