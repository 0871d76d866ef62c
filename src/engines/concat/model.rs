use std::path::Path;

use super::clips::{ClipDirectory, ClipSource, ClipStore, SilenceDurations};
use super::symbols::{PhonemeId, SymbolTable};
use super::tokenizer::{tokenize, StressPolicy};

/// Sample rate every clip and the output file must use.
pub const SAMPLE_RATE: u32 = 48000;

/// Bit depth of every clip and the output file.
pub const BITS_PER_SAMPLE: u16 = 16;

#[derive(thiserror::Error, Debug)]
pub enum ConcatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read clip '{resource}': {source}")]
    ClipRead {
        resource: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid clip '{resource}': {reason}")]
    InvalidClip { resource: String, reason: String },
    #[error("Phoneme '{0}' has no audio")]
    NoAudio(String),
    #[error("Invalid symbol '{symbol}' at byte offset {offset}")]
    UnknownSymbol { offset: usize, symbol: char },
    #[error("Stress marker at byte offset {offset} is followed by a boundary or pause '{found}' instead of a vowel")]
    StressBeforeBoundary { offset: usize, found: String },
    #[error("Stress marker at byte offset {offset} is followed by '{found}', which is not a stressable vowel")]
    StressNotOnVowel { offset: usize, found: String },
    #[error("Stress marker at byte offset {offset} is never followed by a vowel")]
    UnterminatedStress { offset: usize },
    #[error("Invalid symbol table: {0}")]
    Config(String),
    #[error("Invalid silence duration: {0}")]
    InvalidSilence(String),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
}

/// Symbol table plus the clip cache for one clip library.
pub struct ConcatModel {
    symbols: SymbolTable,
    clips: ClipStore,
}

impl ConcatModel {
    /// Load a model backed by a clip directory.
    ///
    /// The symbol table comes from `symbols_path` if given, otherwise from a
    /// `symbols.json` inside the directory, otherwise the built-in table.
    /// Clips themselves are read lazily on first use.
    pub fn load(
        clip_dir: &Path,
        symbols_path: Option<&Path>,
        silence: &SilenceDurations,
    ) -> Result<Self, ConcatError> {
        if !clip_dir.is_dir() {
            return Err(ConcatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Clip directory not found at {}", clip_dir.display()),
            )));
        }
        silence.validate()?;
        log::info!("Using phoneme clips from {}", clip_dir.display());

        let default_symbols = clip_dir.join("symbols.json");
        let symbols = match symbols_path {
            Some(path) => {
                log::info!("Loading symbol table from {}", path.display());
                super::symbols::load_symbols(path)?
            }
            None if default_symbols.exists() => {
                log::info!("Loading symbol table from symbols.json");
                super::symbols::load_symbols(&default_symbols)?
            }
            None => {
                log::warn!("symbols.json not found, using built-in symbol table");
                super::symbols::hardcoded_symbols()
            }
        };

        Ok(Self::from_parts(
            symbols,
            Box::new(ClipDirectory::new(clip_dir)),
            silence,
        ))
    }

    /// Build a model from an already constructed table and clip source.
    pub fn from_parts(
        symbols: SymbolTable,
        source: Box<dyn ClipSource>,
        silence: &SilenceDurations,
    ) -> Self {
        let clips = ClipStore::new(source, &symbols, silence);
        Self { symbols, clips }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn clips(&self) -> &ClipStore {
        &self.clips
    }

    /// Segment a transcription into phoneme identifiers.
    pub fn tokenize(
        &self,
        text: &str,
        policy: StressPolicy,
    ) -> Result<Vec<PhonemeId>, ConcatError> {
        tokenize(text, &self.symbols, policy)
    }

    /// Tokenize `text` and splice the matching clips together.
    pub fn synthesize_text(
        &mut self,
        text: &str,
        policy: StressPolicy,
    ) -> Result<Vec<i16>, ConcatError> {
        let transcript = self.tokenize(text, policy)?;
        if transcript.is_empty() {
            log::warn!("No phonemes produced for text: {text:?}");
        }
        self.concatenate(&transcript)
    }

    /// Concatenate the clips for `transcript` in order.
    ///
    /// The first pass sums the clip lengths, loading each distinct phoneme
    /// once; the second copies every clip into a single buffer allocated at
    /// its final size.
    pub fn concatenate(&mut self, transcript: &[PhonemeId]) -> Result<Vec<i16>, ConcatError> {
        let mut total = 0usize;
        for &id in transcript {
            total += self.clips.get(id)?.len();
        }

        let mut output = vec![0i16; total];
        let mut cursor = 0usize;
        for &id in transcript {
            let samples = self.clips.get(id)?;
            output[cursor..cursor + samples.len()].copy_from_slice(samples);
            cursor += samples.len();
        }
        debug_assert_eq!(cursor, total);

        log::debug!(
            "Concatenated {} phonemes into {} samples ({} clips cached)",
            transcript.len(),
            total,
            self.clips.loaded_count()
        );
        Ok(output)
    }

    /// Names of every phoneme in the active symbol table, in identifier order.
    pub fn list_phonemes(&self) -> Vec<&str> {
        self.symbols
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::engines::concat::clips::tests::clip_bytes;
    use crate::engines::concat::symbols::{PhonemeKind, SymbolEntry};

    struct MemorySource {
        clips: HashMap<String, Vec<u8>>,
        reads: Rc<RefCell<Vec<String>>>,
    }

    impl ClipSource for MemorySource {
        fn read_clip(&self, resource: &str) -> std::io::Result<Vec<u8>> {
            self.reads.borrow_mut().push(resource.to_string());
            self.clips.get(resource).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, resource.to_string())
            })
        }
    }

    fn entry(name: &str, symbol: &str, kind: PhonemeKind) -> SymbolEntry {
        SymbolEntry {
            name: name.to_string(),
            symbol: symbol.to_string(),
            kind,
        }
    }

    fn small_model() -> (ConcatModel, Rc<RefCell<Vec<String>>>) {
        let symbols = SymbolTable::new(vec![
            entry("ma", "m", PhonemeKind::Consonant),
            entry("a_stressed", "ˈa", PhonemeKind::StressedVowel),
            entry("a", "a", PhonemeKind::Vowel),
            entry("space", " ", PhonemeKind::WordBoundary),
            entry("dot", ".", PhonemeKind::SentencePause),
            entry("comma", ",", PhonemeKind::ClausePause),
            entry("stress", "ˈ", PhonemeKind::StressMarker),
        ])
        .expect("valid table");

        let mut clips = HashMap::new();
        clips.insert("ma.wav".to_string(), clip_bytes(&[1, 2, 3]));
        clips.insert("a.wav".to_string(), clip_bytes(&[10, 20]));
        clips.insert("a_stressed.wav".to_string(), clip_bytes(&[30, 40, 50, 60]));

        let reads = Rc::new(RefCell::new(Vec::new()));
        let source = MemorySource {
            clips,
            reads: Rc::clone(&reads),
        };
        let model =
            ConcatModel::from_parts(symbols, Box::new(source), &SilenceDurations::default());
        (model, reads)
    }

    #[test]
    fn concatenates_clips_in_transcript_order() {
        let (mut model, _) = small_model();
        let samples = model
            .synthesize_text("maˈa", StressPolicy::Strict)
            .expect("synthesis should succeed");
        assert_eq!(samples, vec![1, 2, 3, 10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn output_length_is_sum_of_silences() {
        let (mut model, reads) = small_model();
        let samples = model
            .synthesize_text(" .", StressPolicy::Strict)
            .expect("synthesis should succeed");
        assert_eq!(samples.len(), 480);
        assert!(samples.iter().all(|&s| s == 0));
        assert!(reads.borrow().is_empty(), "silences must not touch storage");
    }

    #[test]
    fn recurring_phonemes_are_read_once() {
        let (mut model, reads) = small_model();
        let samples = model
            .synthesize_text("mamama, ma", StressPolicy::Strict)
            .expect("synthesis should succeed");
        assert_eq!(samples.len(), 4 * 5 + 240 + 160);
        assert_eq!(*reads.borrow(), vec!["ma.wav", "a.wav"]);
        assert_eq!(model.clips().loaded_count(), 4);
    }

    #[test]
    fn missing_clip_aborts_synthesis() {
        let symbols = SymbolTable::new(vec![entry("o", "o", PhonemeKind::Vowel)])
            .expect("valid table");
        let source = MemorySource {
            clips: HashMap::new(),
            reads: Rc::new(RefCell::new(Vec::new())),
        };
        let mut model =
            ConcatModel::from_parts(symbols, Box::new(source), &SilenceDurations::default());
        let err = model
            .synthesize_text("o", StressPolicy::Strict)
            .expect_err("missing clip must fail");
        assert!(matches!(err, ConcatError::ClipRead { ref resource, .. } if resource == "o.wav"));
    }

    #[test]
    fn tokenization_failure_loads_nothing() {
        let (mut model, reads) = small_model();
        let err = model
            .synthesize_text("maq", StressPolicy::Strict)
            .expect_err("unknown symbol must fail");
        assert!(matches!(err, ConcatError::UnknownSymbol { offset: 2, symbol: 'q' }));
        assert!(reads.borrow().is_empty());
    }

    #[test]
    fn load_rejects_infinite_silence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let silence = SilenceDurations {
            word_boundary_ms: f64::INFINITY,
            ..SilenceDurations::default()
        };
        let err = ConcatModel::load(dir.path(), None, &silence)
            .err()
            .expect("infinite silence must be rejected");
        assert!(matches!(err, ConcatError::InvalidSilence(_)));
    }

    #[test]
    fn empty_transcript_yields_empty_buffer() {
        let (mut model, _) = small_model();
        let samples = model.concatenate(&[]).expect("empty concat");
        assert!(samples.is_empty());
    }
}
