//! Overlapping windowed frames
//!
//! Frames start every `hop_size` samples. With `PadPolicy::ZeroPad` the last
//! frame may run past the end of the signal and is zero-filled, so every
//! sample lands in at least one frame; `PadPolicy::Drop` keeps only full
//! frames.

use crate::error::{AnalysisError, Result};
use crate::filters::windows::{generate_window, WindowType};
use serde::{Deserialize, Serialize};

/// What to do with trailing samples that do not fill a whole frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadPolicy {
    #[default]
    ZeroPad,
    Drop,
}

/// One windowed frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame index
    pub index: usize,

    /// Offset of the first sample in the source signal
    pub offset: usize,

    /// Windowed samples, always `frame_size` long
    pub samples: Vec<f64>,
}

/// Number of frames for a signal of `len` samples
///
/// `ceil((len - frame_size) / hop_size) + 1` with zero padding,
/// `floor(...) + 1` when dropping, and 0 when `len < frame_size`.
pub fn frame_count(len: usize, frame_size: usize, hop_size: usize, pad_policy: PadPolicy) -> usize {
    if frame_size == 0 || hop_size == 0 || len < frame_size {
        return 0;
    }

    let tail = len - frame_size;
    match pad_policy {
        PadPolicy::ZeroPad => tail.div_ceil(hop_size) + 1,
        PadPolicy::Drop => tail / hop_size + 1,
    }
}

/// Pad `frame_size / 2` zeros on both ends so frame `t` is centred on
/// sample `t * hop_size`
pub fn center_pad(samples: &[f64], frame_size: usize) -> Vec<f64> {
    let pad = frame_size / 2;
    let mut padded = vec![0.0; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);
    padded
}

/// Slices a signal into overlapping windowed frames on demand
#[derive(Debug, Clone)]
pub struct WindowedFramer<'a> {
    signal: &'a [f64],
    frame_size: usize,
    hop_size: usize,
    pad_policy: PadPolicy,
    window: Vec<f64>,
    count: usize,
}

impl<'a> WindowedFramer<'a> {
    /// Create a framer with the default zero-pad policy
    ///
    /// # Arguments
    /// * `signal` - Source samples
    /// * `frame_size` - Samples per frame (F)
    /// * `hop_size` - Samples between frame starts (H)
    /// * `window_type` - Window applied to every frame
    pub fn new(
        signal: &'a [f64],
        frame_size: usize,
        hop_size: usize,
        window_type: WindowType,
    ) -> Result<Self> {
        if frame_size == 0 {
            return Err(AnalysisError::invalid("frame_size", "must be positive"));
        }
        if hop_size == 0 {
            return Err(AnalysisError::invalid("hop_size", "must be positive"));
        }

        Ok(Self {
            signal,
            frame_size,
            hop_size,
            pad_policy: PadPolicy::ZeroPad,
            window: generate_window(window_type, frame_size),
            count: frame_count(signal.len(), frame_size, hop_size, PadPolicy::ZeroPad),
        })
    }

    pub fn with_pad_policy(mut self, pad_policy: PadPolicy) -> Self {
        self.pad_policy = pad_policy;
        self.count = frame_count(self.signal.len(), self.frame_size, self.hop_size, pad_policy);
        self
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn pad_policy(&self) -> PadPolicy {
        self.pad_policy
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Write frame `index` into `out` (window applied, zero-filled past the end)
    pub fn fill_frame(&self, index: usize, out: &mut [f64]) {
        let offset = index * self.hop_size;
        let end = (offset + self.frame_size).min(self.signal.len());
        let available = end.saturating_sub(offset);

        for (i, (dst, &w)) in out.iter_mut().zip(self.window.iter()).enumerate() {
            *dst = if i < available {
                self.signal[offset + i] * w
            } else {
                0.0
            };
        }
    }

    /// Extract frame `index`
    pub fn frame_at(&self, index: usize) -> Frame {
        let mut samples = vec![0.0; self.frame_size];
        self.fill_frame(index, &mut samples);
        Frame {
            index,
            offset: index * self.hop_size,
            samples,
        }
    }

    /// Iterate over all frames in order
    pub fn frames(&self) -> impl ExactSizeIterator<Item = Frame> + '_ {
        (0..self.count).map(move |i| self.frame_at(i))
    }
}

/// Slice a signal into windowed frames (zero-pad policy)
pub fn frame(
    signal: &[f64],
    frame_size: usize,
    hop_size: usize,
    window_type: WindowType,
) -> Result<Vec<Frame>> {
    Ok(WindowedFramer::new(signal, frame_size, hop_size, window_type)?
        .frames()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_formula() {
        // ceil((L - F) / H) + 1
        assert_eq!(frame_count(16000, 2048, 512, PadPolicy::ZeroPad), 29);
        assert_eq!(frame_count(2048, 2048, 512, PadPolicy::ZeroPad), 1);
        assert_eq!(frame_count(2049, 2048, 512, PadPolicy::ZeroPad), 2);
        assert_eq!(frame_count(2560, 2048, 512, PadPolicy::ZeroPad), 2);
        assert_eq!(frame_count(2561, 2048, 512, PadPolicy::Drop), 2);
        assert_eq!(frame_count(2047, 2048, 512, PadPolicy::ZeroPad), 0);
    }

    #[test]
    fn test_frames_match_count() {
        for len in [10usize, 31, 32, 33, 100, 257] {
            let signal = vec![1.0; len];
            let frames = frame(&signal, 32, 7, WindowType::Rectangular).unwrap();
            assert_eq!(frames.len(), frame_count(len, 32, 7, PadPolicy::ZeroPad));
        }
    }

    #[test]
    fn test_short_signal_gives_no_frames() {
        let frames = frame(&[1.0; 100], 2048, 512, WindowType::Hann).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_last_frame_zero_padded() {
        let signal: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let frames = frame(&signal, 4, 4, WindowType::Rectangular).unwrap();

        // Offsets 0, 4, 8 -> last frame holds two real samples
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].offset, 8);
        assert_eq!(frames[2].samples, vec![9.0, 10.0, 0.0, 0.0]);
        assert_eq!(frames[1].samples, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_drop_policy_discards_tail() {
        let signal: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let framer = WindowedFramer::new(&signal, 4, 4, WindowType::Rectangular)
            .unwrap()
            .with_pad_policy(PadPolicy::Drop);

        assert_eq!(framer.len(), 2);
        let last = framer.frames().last().unwrap();
        assert_eq!(last.samples, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_window_applied() {
        let signal = vec![1.0; 8];
        let frames = frame(&signal, 8, 8, WindowType::Hann).unwrap();
        let window = generate_window(WindowType::Hann, 8);
        assert_eq!(frames[0].samples, window);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(matches!(
            WindowedFramer::new(&[0.0; 10], 0, 1, WindowType::Hann),
            Err(AnalysisError::InvalidParameter { name: "frame_size", .. })
        ));
        assert!(matches!(
            WindowedFramer::new(&[0.0; 10], 4, 0, WindowType::Hann),
            Err(AnalysisError::InvalidParameter { name: "hop_size", .. })
        ));
    }

    #[test]
    fn test_center_pad() {
        let padded = center_pad(&[1.0, 2.0], 4);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 2.0, 0.0, 0.0]);
    }
}
