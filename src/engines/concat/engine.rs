use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::{SynthesisEngine, SynthesisResult};

use super::clips::SilenceDurations;
use super::model::{ConcatError, ConcatModel, SAMPLE_RATE};
use super::symbols::PhonemeId;
use super::tokenizer::StressPolicy;

/// Parameters for loading a clip library.
#[derive(Debug, Clone, Default, Builder)]
#[builder(default)]
pub struct ConcatModelParams {
    /// Symbol table JSON to use instead of `symbols.json` / the built-in table.
    #[builder(setter(into, strip_option))]
    pub symbols_path: Option<PathBuf>,
    /// Length of the word boundary and pause silences.
    pub silence: SilenceDurations,
}

/// Parameters for a single synthesis request.
#[derive(Debug, Clone, Default)]
pub struct ConcatInferenceParams {
    pub stress_policy: StressPolicy,
}

/// Concatenative synthesis engine over a directory of phoneme clips.
///
/// # Quick Start
///
/// ```rust,no_run
/// use phoneme_splice::{SynthesisEngine, engines::concat::ConcatEngine};
/// use std::path::PathBuf;
///
/// let mut engine = ConcatEngine::new();
/// engine.load_model(&PathBuf::from("clips/de"))?;
/// let result = engine.synthesize("ɡuːtən tˈaːk.", None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ConcatEngine {
    model: Option<ConcatModel>,
    clip_dir: Option<PathBuf>,
}

impl Default for ConcatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcatEngine {
    pub fn new() -> Self {
        Self {
            model: None,
            clip_dir: None,
        }
    }

    /// Directory the current model was loaded from.
    pub fn clip_dir(&self) -> Option<&Path> {
        self.clip_dir.as_deref()
    }

    /// List all phoneme names (requires model to be loaded).
    pub fn list_phonemes(&self) -> Vec<&str> {
        self.model
            .as_ref()
            .map(|m| m.list_phonemes())
            .unwrap_or_default()
    }

    /// Tokenize without synthesizing, returning phoneme names.
    pub fn transcribe(
        &self,
        text: &str,
        params: Option<ConcatInferenceParams>,
    ) -> Result<Vec<String>, ConcatError> {
        let model = self.model.as_ref().ok_or(ConcatError::ModelNotLoaded)?;
        let p = params.unwrap_or_default();
        let ids: Vec<PhonemeId> = model.tokenize(text, p.stress_policy)?;
        Ok(ids
            .into_iter()
            .map(|id| model.symbols().entry(id).name.clone())
            .collect())
    }
}

impl SynthesisEngine for ConcatEngine {
    type SynthesisParams = ConcatInferenceParams;
    type ModelParams = ConcatModelParams;

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let model = ConcatModel::load(
            model_path,
            params.symbols_path.as_deref(),
            &params.silence,
        )?;
        self.model = Some(model);
        self.clip_dir = Some(model_path.to_path_buf());
        Ok(())
    }

    fn unload_model(&mut self) {
        self.model = None;
        self.clip_dir = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let model = self.model.as_mut().ok_or(ConcatError::ModelNotLoaded)?;

        let p = params.unwrap_or_default();
        let samples = model.synthesize_text(text, p.stress_policy)?;

        Ok(SynthesisResult {
            samples,
            sample_rate: SAMPLE_RATE,
        })
    }
}
