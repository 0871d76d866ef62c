//! # phoneme-splice
//!
//! Concatenative speech synthesis: an IPA transcription goes in, a WAV file
//! built from pre-recorded phoneme clips comes out.
//!
//! ## Features
//!
//! - **Greedy tokenizer**: longest-match segmentation over a configurable symbol table
//! - **Stress marks**: `ˈ` selects the stressed recording of the following vowel
//! - **Lazy clip cache**: every clip is read and validated at most once
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use phoneme_splice::{engines::concat::ConcatEngine, SynthesisEngine};
//!
//! let mut engine = ConcatEngine::new();
//! engine.load_model(&PathBuf::from("clips/de"))?;
//!
//! let result = engine.synthesize("hˈaloː vˈɛlt.", None)?;
//! result.write_wav(&PathBuf::from("output.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;

use std::path::{Path, PathBuf};

/// The result of a synthesis operation.
///
/// Contains 16-bit mono PCM samples and their sample rate.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples
    pub samples: Vec<i16>,
    /// Sample rate of the audio (48000 for clip concatenation)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 16-bit PCM mono WAV file.
    ///
    /// The file is written next to `path` first and renamed into place, so a
    /// failed write never leaves a truncated file at `path`.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        // RIFF sizes are 32-bit and include the 36 header bytes after the size field.
        let data_bytes = self.samples.len() as u64 * 2;
        if data_bytes + 36 > u32::MAX as u64 {
            return Err(format!(
                "{} samples exceed the WAV size limit",
                self.samples.len()
            )
            .into());
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let partial = partial_path(path)
            .ok_or_else(|| format!("Output path {} has no file name", path.display()))?;
        let written = write_samples(&partial, spec, &self.samples)
            .and_then(|()| std::fs::rename(&partial, path).map_err(Into::into));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        log::info!(
            "Wrote {} samples ({:.2}s) to {}",
            self.samples.len(),
            self.duration_secs(),
            path.display()
        );
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn partial_path(path: &Path) -> Option<PathBuf> {
    let mut name = path.file_name()?.to_os_string();
    name.push(".part");
    Some(path.with_file_name(name))
}

fn write_samples(
    path: &Path,
    spec: hound::WavSpec,
    samples: &[i16],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Common interface for text-to-speech synthesis engines.
///
/// Each engine may have different parameter types for model loading and synthesis.
pub trait SynthesisEngine {
    /// Parameters for configuring a synthesis request
    type SynthesisParams;
    /// Parameters for configuring model loading
    type ModelParams: Default;

    /// Load a model from the specified path using default parameters.
    fn load_model(&mut self, model_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.load_model_with_params(model_path, Self::ModelParams::default())
    }

    /// Load a model from the specified path with custom parameters.
    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// Synthesize speech from the given text.
    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Synthesize speech from the given text and write to a WAV file.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_wav()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize(text, params)?.write_wav(wav_path)
    }
}
