//! Chroma (pitch-class) filterbank
//!
//! Every FFT bin is mapped to a fractional pitch class with
//! `n_chroma * log2(f / A0)` (A0 = A440 / 16). Its weight in each chroma row is a
//! Gaussian of the circular pitch-class distance, scaled by the bin's
//! width in pitch-class units so wide low bins spread over several classes.
//! Columns are L2-normalised, then an octave-dominance Gaussian (centred
//! on octave 5, two octaves wide) suppresses very low and very high bins.
//! Row 0 is C.

use crate::error::{AnalysisError, Result};
use ndarray::{Array2, Axis};

/// Centre of the octave-dominance envelope (octaves above A0)
const CENTER_OCTAVE: f64 = 5.0;

/// Width of the octave-dominance envelope in octaves
const OCTAVE_WIDTH: f64 = 2.0;

/// Pitch-class names starting at C
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Build a chroma filterbank, shape `(n_chroma, fft_size/2 + 1)`
///
/// # Arguments
/// * `sample_rate` - Sample rate in Hz
/// * `fft_size` - FFT size
/// * `n_chroma` - Number of pitch classes per octave (12 for semitones)
/// * `tuning` - Deviation from A440 in fractions of a chroma bin
pub fn chroma_filterbank(
    sample_rate: u32,
    fft_size: usize,
    n_chroma: usize,
    tuning: f64,
) -> Result<Array2<f64>> {
    if sample_rate == 0 {
        return Err(AnalysisError::invalid("sample_rate", "must be positive"));
    }
    if fft_size < 2 {
        return Err(AnalysisError::invalid("fft_size", "must be at least 2"));
    }
    if n_chroma == 0 {
        return Err(AnalysisError::invalid("n_chroma", "must be positive"));
    }
    if !tuning.is_finite() {
        return Err(AnalysisError::invalid("tuning", "must be finite"));
    }

    let nc = n_chroma as f64;
    let a440 = 440.0 * 2f64.powf(tuning / nc);
    let reference = a440 / 16.0;
    let bin_hz = sample_rate as f64 / fft_size as f64;

    // Fractional chroma position of every bin over the full FFT length.
    // DC has no pitch: place it 1.5 octaves below bin 1.
    let mut positions = vec![0.0; fft_size];
    for (k, pos) in positions.iter_mut().enumerate().skip(1) {
        *pos = nc * (k as f64 * bin_hz / reference).log2();
    }
    positions[0] = positions[1] - 1.5 * nc;

    let widths: Vec<f64> = (0..fft_size)
        .map(|k| {
            if k + 1 < fft_size {
                (positions[k + 1] - positions[k]).max(1.0)
            } else {
                1.0
            }
        })
        .collect();

    let half = (nc / 2.0).round_ties_even();
    let mut weights = Array2::<f64>::zeros((n_chroma, fft_size));

    for ((c, k), w) in weights.indexed_iter_mut() {
        let distance = (positions[k] - c as f64 + half + 10.0 * nc).rem_euclid(nc) - half;
        let scaled = 2.0 * distance / widths[k];
        *w = (-0.5 * scaled * scaled).exp();
    }

    // Unit L2 norm per FFT bin
    for mut column in weights.axis_iter_mut(Axis(1)) {
        let norm = column.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > f64::MIN_POSITIVE {
            column.mapv_inplace(|w| w / norm);
        }
    }

    // Octave dominance
    for (k, mut column) in weights.axis_iter_mut(Axis(1)).enumerate() {
        let octave = (positions[k] / nc - CENTER_OCTAVE) / OCTAVE_WIDTH;
        let envelope = (-0.5 * octave * octave).exp();
        column.mapv_inplace(|w| w * envelope);
    }

    // Rotate so row 0 is C instead of A
    let shift = 3 * (n_chroma / 12);
    let n_bins = fft_size / 2 + 1;
    let filterbank = Array2::from_shape_fn((n_chroma, n_bins), |(c, k)| {
        weights[[(c + shift) % n_chroma, k]]
    });

    log::debug!(
        "Built chroma filterbank: {} classes x {} bins at {} Hz (tuning {})",
        n_chroma,
        n_bins,
        sample_rate,
        tuning
    );

    Ok(filterbank)
}

/// Scale every frame (column) so its largest value is 1.0
///
/// Columns without energy are left at zero.
pub fn normalize_frames_max(values: &mut Array2<f64>) {
    for mut column in values.axis_iter_mut(Axis(1)) {
        let peak = column.fold(0.0f64, |acc, &v| acc.max(v.abs()));
        if peak > f64::MIN_POSITIVE {
            column.mapv_inplace(|v| v / peak);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strongest_class(fb: &Array2<f64>, bin: usize) -> usize {
        fb.column(bin)
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(c, _)| c)
            .unwrap()
    }

    #[test]
    fn test_chroma_shape_and_sign() {
        let fb = chroma_filterbank(22050, 2048, 12, 0.0).unwrap();
        assert_eq!(fb.dim(), (12, 1025));
        assert!(fb.iter().all(|&w| w >= 0.0 && w.is_finite()));
    }

    #[test]
    fn test_a440_maps_to_a() {
        // 440 Hz lands on a bin centre: 16000 / 16000 * 440
        let fb = chroma_filterbank(16000, 16000, 12, 0.0).unwrap();
        assert_eq!(PITCH_CLASSES[strongest_class(&fb, 440)], "A");
    }

    #[test]
    fn test_middle_c_maps_to_c() {
        // C4 = 261.63 Hz; with 1 Hz bins, bin 262 is nearest
        let fb = chroma_filterbank(16000, 16000, 12, 0.0).unwrap();
        assert_eq!(strongest_class(&fb, 262), 0);
        // E5 = 659.26 Hz
        assert_eq!(PITCH_CLASSES[strongest_class(&fb, 659)], "E");
    }

    #[test]
    fn test_octave_equivalence() {
        let fb = chroma_filterbank(16000, 16000, 12, 0.0).unwrap();
        for bin in [220, 440, 880, 1760] {
            assert_eq!(strongest_class(&fb, bin), 9);
        }
    }

    #[test]
    fn test_octave_envelope_suppresses_extremes() {
        let fb = chroma_filterbank(16000, 16000, 12, 0.0).unwrap();
        let energy = |bin: usize| fb.column(bin).iter().map(|w| w * w).sum::<f64>();

        // Octave 5 above A0 is 880 Hz
        assert!(energy(880) > energy(30) * 10.0);
        assert!(energy(880) > energy(7900) * 10.0);
        assert!(energy(0) < 1e-3);
    }

    #[test]
    fn test_tuning_shifts_classes() {
        // A quarter-tone sharp tuning moves 453 Hz (A + 1/2 semitone) onto A
        let fb = chroma_filterbank(16000, 16000, 12, 0.5).unwrap();
        assert_eq!(strongest_class(&fb, 453), 9);
    }

    #[test]
    fn test_normalize_frames_max() {
        let mut values = ndarray::array![[1.0, 0.0], [4.0, 0.0], [2.0, 0.0]];
        normalize_frames_max(&mut values);

        assert_eq!(values.column(0).to_vec(), vec![0.25, 1.0, 0.5]);
        assert_eq!(values.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(chroma_filterbank(16000, 2048, 0, 0.0).is_err());
        assert!(chroma_filterbank(16000, 1, 12, 0.0).is_err());
        assert!(chroma_filterbank(16000, 2048, 12, f64::NAN).is_err());
    }
}
