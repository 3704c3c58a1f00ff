//! Window functions for short-time spectral analysis
//!
//! All windows are generated in their DFT-even (periodic) form, the
//! convention used for STFT framing: `w[n]` is sampled from a period of
//! `M` rather than `M - 1`, so overlapping Hann frames at hop `M/4` sum
//! to a constant.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/M)
    /// Sidelobe attenuation: ~31 dB, fast sidelobe roll-off
    #[default]
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/M)
    /// Sidelobe attenuation: ~43 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/M) + 0.08*cos(4πn/M)
    /// Sidelobe attenuation: ~58 dB
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

/// Generate periodic window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let m = length as f64;

    match window_type {
        WindowType::Hann => (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / m;
                0.5 - 0.5 * angle.cos()
            })
            .collect(),

        WindowType::Hamming => (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / m;
                0.54 - 0.46 * angle.cos()
            })
            .collect(),

        WindowType::Blackman => (0..length)
            .map(|n| {
                let angle1 = 2.0 * PI * n as f64 / m;
                let angle2 = 4.0 * PI * n as f64 / m;
                // Clamp tiny negative rounding at n = 0
                (0.42 - 0.5 * angle1.cos() + 0.08 * angle2.cos()).max(0.0)
            })
            .collect(),

        WindowType::Rectangular => vec![1.0; length],
    }
}
