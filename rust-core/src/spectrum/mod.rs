//! Spectral analysis with FFT: framing, STFT and whole-signal spectrum

pub mod analysis;
pub mod fft;
pub mod framing;
pub mod stft;

pub use analysis::{spectrum, FrequencySpectrum};
pub use fft::{bin_frequencies, full_fft, FftEngine};
pub use framing::{frame, Frame, PadPolicy, WindowedFramer};
pub use stft::{stft, to_db_spectrogram, DbOptions, StftMatrix};
