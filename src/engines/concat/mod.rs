//! Concatenative synthesis from IPA transcriptions.
//!
//! The engine splits a transcription into phonemes by greedy longest match
//! against a symbol table, then splices one pre-recorded clip per phoneme
//! into a single 48 kHz, 16-bit mono buffer. Word boundaries and pauses are
//! rendered as silence.
//!
//! # Clip Directory Layout
//!
//! ```text
//! clips/de/
//! ├── aale.wav            # one clip per phoneme, named after the symbol entry
//! ├── aale_stressed.wav
//! ├── ...
//! └── symbols.json        # optional, replaces the built-in German table
//! ```
//!
//! Every clip must be an uncompressed PCM WAV file, mono, 16-bit, 48000 Hz,
//! with the canonical 44-byte header. Clips are read lazily, once each.
//!
//! # Transcription Format
//!
//! Symbols are written back to back without separators. `" "` is a word
//! boundary, `","` a clause pause and `"."` a sentence pause. A stress marker
//! `ˈ` selects the stressed recording of the vowel that follows it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use phoneme_splice::{SynthesisEngine, engines::concat::{ConcatEngine, ConcatInferenceParams, StressPolicy}};
//! use std::path::PathBuf;
//!
//! let mut engine = ConcatEngine::new();
//! engine.load_model(&PathBuf::from("clips/de"))?;
//!
//! let params = ConcatInferenceParams {
//!     stress_policy: StressPolicy::Lenient,
//! };
//! engine.synthesize_to_file("ˈʃtaːt", &PathBuf::from("out.wav"), Some(params))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clips;
pub mod engine;
pub mod model;
pub mod symbols;
pub mod tokenizer;

pub use clips::{ClipDirectory, ClipSource, ClipStore, SilenceDurations};
pub use engine::{ConcatEngine, ConcatInferenceParams, ConcatModelParams, ConcatModelParamsBuilder};
pub use model::{ConcatError, ConcatModel};
pub use symbols::{PhonemeId, PhonemeKind, SymbolEntry, SymbolTable};
pub use tokenizer::StressPolicy;
