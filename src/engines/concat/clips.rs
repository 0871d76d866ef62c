use std::path::{Path, PathBuf};

use super::model::{ConcatError, BITS_PER_SAMPLE, SAMPLE_RATE};
use super::symbols::{PhonemeId, PhonemeKind, SymbolTable};

/// Size of the canonical RIFF/WAVE header shared by clips and output files.
pub const HEADER_LEN: usize = 44;

const WAVE_FORMAT_PCM: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Where clip bytes come from.
pub trait ClipSource {
    /// Read the whole resource into memory.
    fn read_clip(&self, resource: &str) -> std::io::Result<Vec<u8>>;
}

/// Clip library stored as one file per phoneme in a directory.
pub struct ClipDirectory {
    root: PathBuf,
}

impl ClipDirectory {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl ClipSource for ClipDirectory {
    fn read_clip(&self, resource: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(resource))
    }
}

/// Length of the three pauses, in milliseconds.
///
/// Sample counts are derived from [`SAMPLE_RATE`]; the defaults give 160,
/// 320 and 240 samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceDurations {
    pub word_boundary_ms: f64,
    pub sentence_pause_ms: f64,
    pub clause_pause_ms: f64,
}

impl Default for SilenceDurations {
    fn default() -> Self {
        Self {
            word_boundary_ms: samples_to_ms(160),
            sentence_pause_ms: samples_to_ms(320),
            clause_pause_ms: samples_to_ms(240),
        }
    }
}

impl SilenceDurations {
    /// Longest accepted pause.
    pub const MAX_MS: f64 = 60_000.0;

    /// Reject durations that are negative, not finite, or above [`Self::MAX_MS`].
    pub fn validate(&self) -> Result<(), ConcatError> {
        for (name, ms) in [
            ("word boundary", self.word_boundary_ms),
            ("sentence pause", self.sentence_pause_ms),
            ("clause pause", self.clause_pause_ms),
        ] {
            if !ms.is_finite() || !(0.0..=Self::MAX_MS).contains(&ms) {
                return Err(ConcatError::InvalidSilence(format!(
                    "{name} is {ms} ms, expected 0 to {} ms",
                    Self::MAX_MS
                )));
            }
        }
        Ok(())
    }

    /// Number of zero samples for a silence kind, `None` for everything else.
    pub fn samples_for(&self, kind: PhonemeKind) -> Option<usize> {
        let ms = match kind {
            PhonemeKind::WordBoundary => self.word_boundary_ms,
            PhonemeKind::SentencePause => self.sentence_pause_ms,
            PhonemeKind::ClausePause => self.clause_pause_ms,
            _ => return None,
        };
        let ms = if ms.is_nan() { 0.0 } else { ms.clamp(0.0, Self::MAX_MS) };
        Some((ms * SAMPLE_RATE as f64 / 1000.0).round() as usize)
    }
}

fn samples_to_ms(samples: usize) -> f64 {
    samples as f64 * 1000.0 / SAMPLE_RATE as f64
}

enum Backing {
    Clip(String),
    Silence(usize),
    Marker(String),
}

/// Per-phoneme sample cache.
///
/// Every slot starts empty and is filled the first time its phoneme is
/// requested. Filled slots are never reloaded or evicted.
pub struct ClipStore {
    source: Box<dyn ClipSource>,
    backing: Vec<Backing>,
    slots: Vec<Option<Vec<i16>>>,
}

impl ClipStore {
    pub fn new(
        source: Box<dyn ClipSource>,
        symbols: &SymbolTable,
        silence: &SilenceDurations,
    ) -> Self {
        let backing: Vec<Backing> = symbols
            .entries()
            .iter()
            .map(|entry| match entry.kind {
                PhonemeKind::StressMarker => Backing::Marker(entry.name.clone()),
                kind => match silence.samples_for(kind) {
                    Some(len) => Backing::Silence(len),
                    None => Backing::Clip(entry.resource_name()),
                },
            })
            .collect();
        let slots = backing.iter().map(|_| None).collect();

        Self {
            source,
            backing,
            slots,
        }
    }

    /// Samples for `id`, loading them on first access.
    pub fn get(&mut self, id: PhonemeId) -> Result<&[i16], ConcatError> {
        let index = id.index();
        if self.slots[index].is_none() {
            let samples = self.load(index)?;
            self.slots[index] = Some(samples);
        }
        Ok(self.slots[index].as_deref().unwrap_or_default())
    }

    pub fn is_loaded(&self, id: PhonemeId) -> bool {
        self.slots[id.index()].is_some()
    }

    /// Number of phonemes currently held in memory.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn load(&self, index: usize) -> Result<Vec<i16>, ConcatError> {
        match &self.backing[index] {
            Backing::Silence(len) => Ok(vec![0; *len]),
            Backing::Marker(name) => Err(ConcatError::NoAudio(name.clone())),
            Backing::Clip(resource) => {
                let data =
                    self.source
                        .read_clip(resource)
                        .map_err(|source| ConcatError::ClipRead {
                            resource: resource.clone(),
                            source,
                        })?;
                let samples = parse_clip(&data, resource)?;
                log::debug!("Loaded {resource} ({} samples)", samples.len());
                Ok(samples)
            }
        }
    }
}

/// Read and validate a clip file from disk.
pub fn load_clip(path: &Path) -> Result<Vec<i16>, ConcatError> {
    let resource = path.display().to_string();
    let data = std::fs::read(path).map_err(|source| ConcatError::ClipRead {
        resource: resource.clone(),
        source,
    })?;
    parse_clip(&data, &resource)
}

/// Parse a mono 16-bit 48 kHz PCM WAV file with the canonical 44-byte header.
///
/// Nothing is converted: any other layout or format is rejected.
pub fn parse_clip(data: &[u8], name: &str) -> Result<Vec<i16>, ConcatError> {
    let invalid = |reason: String| ConcatError::InvalidClip {
        resource: name.to_string(),
        reason,
    };

    if data.len() < HEADER_LEN {
        return Err(invalid(format!(
            "file too short ({} bytes, header needs {HEADER_LEN})",
            data.len()
        )));
    }

    let tag = |at: usize| &data[at..at + 4];
    let u16_at = |at: usize| u16::from_le_bytes([data[at], data[at + 1]]);
    let u32_at =
        |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

    if tag(0) != b"RIFF" {
        return Err(invalid("missing RIFF tag".to_string()));
    }
    if tag(8) != b"WAVE" {
        return Err(invalid("missing WAVE tag".to_string()));
    }
    if tag(12) != b"fmt " {
        return Err(invalid("missing fmt chunk".to_string()));
    }
    let fmt_len = u32_at(16);
    if fmt_len != FMT_CHUNK_LEN {
        return Err(invalid(format!(
            "fmt chunk is {fmt_len} bytes, expected {FMT_CHUNK_LEN}"
        )));
    }

    let format_tag = u16_at(20);
    let channels = u16_at(22);
    let sample_rate = u32_at(24);
    let bits_per_sample = u16_at(34);

    if format_tag != WAVE_FORMAT_PCM {
        return Err(invalid(format!(
            "format tag {format_tag} is not uncompressed PCM"
        )));
    }
    if channels != 1 {
        return Err(invalid(format!("{channels} channels, expected mono")));
    }
    if bits_per_sample != BITS_PER_SAMPLE {
        return Err(invalid(format!(
            "{bits_per_sample} bits per sample, expected {BITS_PER_SAMPLE}"
        )));
    }
    if sample_rate != SAMPLE_RATE {
        return Err(invalid(format!(
            "sample rate {sample_rate} Hz, expected {SAMPLE_RATE} Hz"
        )));
    }

    if tag(36) != b"data" {
        return Err(invalid("data chunk does not follow fmt chunk".to_string()));
    }
    let data_len = u32_at(40) as usize;
    let payload = &data[HEADER_LEN..];
    if payload.len() < data_len {
        return Err(invalid(format!(
            "data chunk truncated (declared {data_len} bytes, got {})",
            payload.len()
        )));
    }

    Ok(payload[..data_len]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}
