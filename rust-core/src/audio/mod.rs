//! Audio input boundary: decoded signals, decoding and resampling

pub mod decoder;
pub mod resample;
pub mod signal;

pub use decoder::{AudioDecoder, SymphoniaDecoder, UploadedFile};
pub use resample::resample_to;
pub use signal::Signal;
