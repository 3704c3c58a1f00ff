//! Window functions and spectral filterbanks (mel, chroma)

pub mod cache;
pub mod chroma;
pub mod mel;
pub mod projection;
pub mod windows;

pub use cache::{FilterbankCache, FilterbankKey, SharedFilterbank};
pub use chroma::{chroma_filterbank, normalize_frames_max, PITCH_CLASSES};
pub use mel::{mel_filterbank, MelNorm};
pub use projection::project;
pub use windows::{generate_window, WindowType};
