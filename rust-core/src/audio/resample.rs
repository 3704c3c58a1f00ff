//! Offline sample-rate conversion with rubato
//!
//! Used when files recorded at different rates should share one analysis
//! grid. The whole buffer is pushed through a windowed-sinc resampler in
//! fixed chunks, then the resampler delay is trimmed so the output stays
//! time-aligned with the input.

use super::signal::Signal;
use crate::error::{AnalysisError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const CHUNK_SIZE: usize = 1024;

/// Resample a signal to `target_rate`
///
/// Returns the signal unchanged when the rates already match.
pub fn resample_to(signal: &Signal, target_rate: u32) -> Result<Signal> {
    if target_rate == 0 {
        return Err(AnalysisError::invalid("target_sample_rate", "must be positive"));
    }
    if signal.sample_rate() == target_rate {
        return Ok(signal.clone());
    }

    let ratio = target_rate as f64 / signal.sample_rate() as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f64>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| AnalysisError::Resample(e.to_string()))?;

    let input = signal.samples();
    let expected_len = ((input.len() as f64) * ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<f64> = Vec::with_capacity(expected_len + delay + CHUNK_SIZE);

    let mut chunks = input.chunks_exact(CHUNK_SIZE);
    for chunk in chunks.by_ref() {
        let out = resampler
            .process(&[chunk][..], None)
            .map_err(|e| AnalysisError::Resample(e.to_string()))?;
        output.extend_from_slice(&out[0]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let out = resampler
            .process_partial(Some(&[remainder][..]), None)
            .map_err(|e| AnalysisError::Resample(e.to_string()))?;
        output.extend_from_slice(&out[0]);
    }

    // Flush the delay line until enough samples are out
    while output.len() < expected_len + delay {
        let out = resampler
            .process_partial::<&[f64]>(None, None)
            .map_err(|e| AnalysisError::Resample(e.to_string()))?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    let start = delay.min(output.len());
    let end = (start + expected_len).min(output.len());
    let resampled = output[start..end].to_vec();

    log::debug!(
        "Resampled {} -> {} samples ({} Hz -> {} Hz)",
        input.len(),
        resampled.len(),
        signal.sample_rate(),
        target_rate
    );

    Signal::new(resampled, target_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: u32, len: usize) -> Signal {
        let samples = (0..len)
            .map(|n| (2.0 * PI * freq * n as f64 / sample_rate as f64).sin())
            .collect();
        Signal::new(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_same_rate_is_identity() {
        let signal = sine(440.0, 16000, 1000);
        let out = resample_to(&signal, 16000).unwrap();
        assert_eq!(out, signal);
    }

    #[test]
    fn test_downsample_length_and_content() {
        let signal = sine(440.0, 44100, 44100);
        let out = resample_to(&signal, 22050).unwrap();

        assert_eq!(out.sample_rate(), 22050);
        assert!((out.len() as i64 - 22050).abs() <= 2);

        // Amplitude and pitch survive: RMS of a unit sine, 880 zero crossings per second
        let body = &out.samples()[1000..21000];
        let rms = (body.iter().map(|s| s * s).sum::<f64>() / body.len() as f64).sqrt();
        assert!((rms - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.02, "rms {}", rms);

        let crossings = body
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        let expected = 880.0 * body.len() as f64 / 22050.0;
        assert!((crossings as f64 - expected).abs() < 4.0, "crossings {}", crossings);
    }

    #[test]
    fn test_zero_target_rejected() {
        let signal = sine(440.0, 16000, 100);
        assert!(matches!(
            resample_to(&signal, 0),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }
}
