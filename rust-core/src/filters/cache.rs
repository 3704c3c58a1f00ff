//! Process-wide memo of filterbank matrices
//!
//! Filterbanks depend only on their construction parameters, so one matrix
//! is shared (behind an `Arc`) by every file analysed with the same key.
//! Entries never go stale; `clear` exists for memory control only.

use super::chroma::chroma_filterbank;
use super::mel::{mel_filterbank, MelNorm};
use crate::error::Result;
use ndarray::Array2;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Shared, immutable filterbank
pub type SharedFilterbank = Arc<Array2<f64>>;

/// Everything a filterbank is a pure function of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterbankKey {
    Mel {
        sample_rate: u32,
        fft_size: usize,
        n_mels: usize,
        norm: MelNorm,
    },
    Chroma {
        sample_rate: u32,
        fft_size: usize,
        n_chroma: usize,
        tuning_bits: u64,
    },
}

impl FilterbankKey {
    fn build(&self) -> Result<Array2<f64>> {
        match *self {
            FilterbankKey::Mel {
                sample_rate,
                fft_size,
                n_mels,
                norm,
            } => mel_filterbank(sample_rate, fft_size, n_mels, norm),
            FilterbankKey::Chroma {
                sample_rate,
                fft_size,
                n_chroma,
                tuning_bits,
            } => chroma_filterbank(sample_rate, fft_size, n_chroma, f64::from_bits(tuning_bits)),
        }
    }
}

/// Thread-safe filterbank cache
#[derive(Debug, Default)]
pub struct FilterbankCache {
    entries: Mutex<HashMap<FilterbankKey, SharedFilterbank>>,
}

impl FilterbankCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache
    pub fn global() -> Arc<FilterbankCache> {
        static GLOBAL: OnceLock<Arc<FilterbankCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(FilterbankCache::new())))
    }

    pub fn mel(
        &self,
        sample_rate: u32,
        fft_size: usize,
        n_mels: usize,
        norm: MelNorm,
    ) -> Result<SharedFilterbank> {
        self.get_or_build(FilterbankKey::Mel {
            sample_rate,
            fft_size,
            n_mels,
            norm,
        })
    }

    pub fn chroma(
        &self,
        sample_rate: u32,
        fft_size: usize,
        n_chroma: usize,
        tuning: f64,
    ) -> Result<SharedFilterbank> {
        // +0.0 and -0.0 build the same matrix
        let tuning = if tuning == 0.0 { 0.0 } else { tuning };
        self.get_or_build(FilterbankKey::Chroma {
            sample_rate,
            fft_size,
            n_chroma,
            tuning_bits: tuning.to_bits(),
        })
    }

    /// Fetch a filterbank, building it on a miss
    ///
    /// The matrix is built outside the lock; when two threads miss on the
    /// same key at once, the first insert wins and both get that matrix.
    pub fn get_or_build(&self, key: FilterbankKey) -> Result<SharedFilterbank> {
        if let Some(hit) = self.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        let built = Arc::new(key.build()?);
        let mut entries = self.lock();
        let entry = entries.entry(key).or_insert(built);
        Ok(Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are only ever inserted whole, so a poisoned map is still valid
    fn lock(&self) -> MutexGuard<'_, HashMap<FilterbankKey, SharedFilterbank>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_shares_matrix() {
        let cache = FilterbankCache::new();

        let a = cache.mel(16000, 2048, 64, MelNorm::Slaney).unwrap();
        let b = cache.mel(16000, 2048, 64, MelNorm::Slaney).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keys_distinguish_parameters() {
        let cache = FilterbankCache::new();

        let mel = cache.mel(16000, 2048, 64, MelNorm::Slaney).unwrap();
        let mel_unit = cache.mel(16000, 2048, 64, MelNorm::Unit).unwrap();
        let mel_rate = cache.mel(22050, 2048, 64, MelNorm::Slaney).unwrap();
        let chroma = cache.chroma(16000, 2048, 12, 0.0).unwrap();
        let chroma_tuned = cache.chroma(16000, 2048, 12, 0.25).unwrap();

        assert!(!Arc::ptr_eq(&mel, &mel_unit));
        assert!(!Arc::ptr_eq(&mel, &mel_rate));
        assert!(!Arc::ptr_eq(&chroma, &chroma_tuned));
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_cached_matches_direct_build() {
        let cache = FilterbankCache::new();
        let cached = cache.chroma(22050, 1024, 12, -0.0).unwrap();
        let direct = chroma_filterbank(22050, 1024, 12, 0.0).unwrap();

        assert_eq!(*cached, direct);
        assert!(Arc::ptr_eq(&cached, &cache.chroma(22050, 1024, 12, 0.0).unwrap()));
    }

    #[test]
    fn test_build_error_not_cached() {
        let cache = FilterbankCache::new();
        assert!(cache.mel(16000, 2048, 0, MelNorm::Slaney).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(FilterbankCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.mel(16000, 1024, 40, MelNorm::Slaney).unwrap())
            })
            .collect();

        let matrices: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for m in &matrices[1..] {
            assert!(Arc::ptr_eq(&matrices[0], m));
        }
        assert_eq!(cache.len(), 1);
    }
}
