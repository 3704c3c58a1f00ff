//! End-to-end tests for the batch analysis pipeline

use audio_atlas::{
    analyze_batch, AnalysisConfig, AnalysisError, AnalysisKind, AnalysisOrchestrator,
    AnalysisOutput, AudioDecoder, BatchOutcome, FilterbankCache, Signal, SymphoniaDecoder,
    UploadedFile,
};
use std::f64::consts::PI;
use std::sync::Arc;

fn sine(freq: f64, sample_rate: u32, seconds: f64) -> Vec<f64> {
    let len = (seconds * sample_rate as f64) as usize;
    (0..len)
        .map(|n| 0.5 * (2.0 * PI * freq * n as f64 / sample_rate as f64).sin())
        .collect()
}

/// 16-bit PCM mono WAV in memory
fn wav_bytes(samples: &[f64], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        bytes.extend_from_slice(&((s * i16::MAX as f64).round() as i16).to_le_bytes());
    }
    bytes
}

/// Decoder that reads little-endian f64 samples at a fixed rate
struct RawF64Decoder {
    sample_rate: u32,
}

impl AudioDecoder for RawF64Decoder {
    fn decode(&self, file: &UploadedFile) -> audio_atlas::Result<Signal> {
        if file.bytes.len() % 8 != 0 {
            return Err(AnalysisError::Decode(format!("{}: truncated sample", file.name)));
        }
        let samples = file
            .bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                f64::from_le_bytes(raw)
            })
            .collect();
        Signal::new(samples, self.sample_rate)
    }
}

fn raw_bytes(samples: &[f64]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn orchestrator(config: AnalysisConfig) -> AnalysisOrchestrator {
    AnalysisOrchestrator::with_cache(config, Arc::new(FilterbankCache::new())).unwrap()
}

#[test]
fn test_sine_end_to_end() {
    let config = AnalysisConfig {
        freq_ceiling_hz: 1000.0,
        ..Default::default()
    };
    let files = vec![UploadedFile::new("a440.wav", wav_bytes(&sine(440.0, 16000, 1.0), 16000))];

    let outcome = analyze_batch(&files, &SymphoniaDecoder, &orchestrator(config));
    let report = outcome.reports()[0].outcome.as_ref().unwrap();
    assert!(report.is_complete());

    let spectrogram = report.get(AnalysisKind::Spectrogram).unwrap();
    let values = spectrogram.matrix().unwrap();
    let frequencies = spectrogram.bin_frequencies().unwrap();
    assert_eq!(values.ncols(), 29);
    assert_eq!(spectrogram.frame_times().unwrap().len(), 29);

    for column in values.columns() {
        let peak_bin = column
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap();
        assert!((frequencies[peak_bin] - 440.0).abs() < 16000.0 / 2048.0);
    }
    assert_eq!(values.fold(f64::NEG_INFINITY, |a, &v| a.max(v)), 0.0);
    assert!(values.iter().all(|&v| v >= -80.0));

    let Some(AnalysisOutput::Spectrum(spectrum)) = report.get(AnalysisKind::Spectrum) else {
        panic!("missing spectrum");
    };
    assert_eq!(spectrum.peak().unwrap().0, 440.0);
    assert!(*spectrum.frequencies.last().unwrap() <= 1000.0);
}

#[test]
fn test_partial_failure_keeps_valid_file() {
    let files = vec![
        UploadedFile::new("good.raw", raw_bytes(&sine(220.0, 8000, 1.0))),
        UploadedFile::new("bad.raw", vec![0u8; 13]),
        UploadedFile::new("short.raw", raw_bytes(&sine(220.0, 8000, 0.05))),
    ];
    let decoder = RawF64Decoder { sample_rate: 8000 };

    let BatchOutcome::Analyzed(reports) = analyze_batch(&files, &decoder, &orchestrator(AnalysisConfig::default())) else {
        panic!("files were supplied");
    };
    let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["good.raw", "bad.raw", "short.raw"]);

    assert!(reports[0].outcome.as_ref().unwrap().is_complete());
    assert!(matches!(reports[1].outcome, Err(AnalysisError::Decode(_))));

    // 400 samples: too short for a 2048-sample frame
    let short = reports[2].outcome.as_ref().unwrap();
    assert!(short.get(AnalysisKind::Waveform).is_some());
    assert!(short.get(AnalysisKind::Spectrum).is_some());
    assert!(matches!(
        short.failure(AnalysisKind::Mfcc),
        Some(AnalysisError::SignalTooShort { len: 400, .. })
    ));
}

#[test]
fn test_empty_file_is_decode_failure_only() {
    let files = vec![
        UploadedFile::new("empty.raw", Vec::new()),
        UploadedFile::new("tone.raw", raw_bytes(&sine(440.0, 8000, 0.5))),
    ];
    let decoder = RawF64Decoder { sample_rate: 8000 };

    let outcome = analyze_batch(&files, &decoder, &orchestrator(AnalysisConfig::default()));
    let reports = outcome.reports();
    assert_eq!(reports[0].outcome, Err(AnalysisError::EmptySignal));
    assert!(reports[1].is_ok());
}

#[test]
fn test_nothing_to_analyze() {
    let outcome = analyze_batch(&[], &SymphoniaDecoder, &orchestrator(AnalysisConfig::default()));
    assert_eq!(outcome, BatchOutcome::NothingToAnalyze);
}

#[test]
fn test_shared_cache_across_batch() {
    let cache = Arc::new(FilterbankCache::new());
    let orchestrator = AnalysisOrchestrator::with_cache(AnalysisConfig::default(), Arc::clone(&cache)).unwrap();
    let files: Vec<_> = [220.0, 330.0, 440.0, 550.0]
        .iter()
        .map(|&f| UploadedFile::new(format!("{}.raw", f), raw_bytes(&sine(f, 8000, 0.5))))
        .collect();

    analyze_batch(&files, &RawF64Decoder { sample_rate: 8000 }, &orchestrator);

    // One mel and one chroma matrix serve all four files
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_config_from_json_drives_batch() {
    let config = AnalysisConfig::from_json(
        r#"{"frame_size": 1024, "hop_size": 256, "n_mels": 40, "n_mfcc": 20, "enabled_analyses": ["mfcc"]}"#,
    )
    .unwrap();
    let files = vec![UploadedFile::new("tone.raw", raw_bytes(&sine(440.0, 8000, 1.0)))];

    let outcome = analyze_batch(&files, &RawF64Decoder { sample_rate: 8000 }, &orchestrator(config));
    let report = outcome.reports()[0].outcome.as_ref().unwrap();

    assert_eq!(report.results.len(), 1);
    let mfcc = report.get(AnalysisKind::Mfcc).unwrap().matrix().unwrap();
    // ceil((8000 - 1024) / 256) + 1
    assert_eq!(mfcc.dim(), (20, 29));
}
