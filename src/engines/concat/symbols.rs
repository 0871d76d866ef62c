use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::model::ConcatError;

/// Dense index of a phoneme in its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhonemeId(u16);

impl PhonemeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonemeKind {
    Consonant,
    Vowel,
    /// Stressed form of the vowel listed directly after it.
    StressedVowel,
    WordBoundary,
    SentencePause,
    ClausePause,
    /// Consumed by the tokenizer, never emitted.
    StressMarker,
}

impl PhonemeKind {
    pub fn is_silence(self) -> bool {
        matches!(
            self,
            PhonemeKind::WordBoundary | PhonemeKind::SentencePause | PhonemeKind::ClausePause
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolEntry {
    /// Identifier name; the clip file is `<name>.wav`.
    pub name: String,
    /// Text matched in the transcription.
    pub symbol: String,
    pub kind: PhonemeKind,
}

impl SymbolEntry {
    pub fn resource_name(&self) -> String {
        format!("{}.wav", self.name)
    }
}

#[derive(Deserialize)]
struct SymbolFile {
    symbols: Vec<SymbolEntry>,
}

/// Immutable phoneme inventory.
///
/// Identifiers are positions in the entry list. Matching does not follow
/// that order: `match_order` is derived once so that longer symbols are
/// always tried before shorter ones and the stress marker is tried last.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    match_order: Vec<PhonemeId>,
}

impl SymbolTable {
    /// Validate `entries` and build the table.
    pub fn new(entries: Vec<SymbolEntry>) -> Result<Self, ConcatError> {
        validate(&entries)?;
        Ok(Self::build(entries))
    }

    fn build(entries: Vec<SymbolEntry>) -> Self {
        let mut match_order: Vec<PhonemeId> =
            (0..entries.len()).map(|i| PhonemeId(i as u16)).collect();
        // Stable, so equal-length symbols keep identifier order.
        match_order.sort_by_key(|id| {
            let entry = &entries[id.index()];
            (
                entry.kind == PhonemeKind::StressMarker,
                Reverse(entry.symbol.len()),
            )
        });
        Self {
            entries,
            match_order,
        }
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn entry(&self, id: PhonemeId) -> &SymbolEntry {
        &self.entries[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = PhonemeId> + '_ {
        (0..self.entries.len()).map(|i| PhonemeId(i as u16))
    }

    pub fn match_order(&self) -> &[PhonemeId] {
        &self.match_order
    }

    /// Look up a phoneme by identifier name.
    pub fn find(&self, name: &str) -> Option<PhonemeId> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(|i| PhonemeId(i as u16))
    }

    /// First entry in match order whose symbol starts at `offset` in `text`.
    pub fn match_at(&self, text: &str, offset: usize) -> Option<PhonemeId> {
        let rest = text.get(offset..)?;
        self.match_order
            .iter()
            .copied()
            .find(|&id| rest.starts_with(self.entry(id).symbol.as_str()))
    }

    /// Stressed variant of a vowel: the entry right before it, if it is one.
    pub fn stressed_variant(&self, id: PhonemeId) -> Option<PhonemeId> {
        if self.entry(id).kind != PhonemeKind::Vowel || id.0 == 0 {
            return None;
        }
        let previous = PhonemeId(id.0 - 1);
        (self.entry(previous).kind == PhonemeKind::StressedVowel).then_some(previous)
    }
}

fn validate(entries: &[SymbolEntry]) -> Result<(), ConcatError> {
    if entries.is_empty() {
        return Err(ConcatError::Config("symbol table is empty".to_string()));
    }
    if entries.len() > u16::MAX as usize {
        return Err(ConcatError::Config(format!(
            "too many symbols ({})",
            entries.len()
        )));
    }

    let mut names = HashSet::new();
    let mut symbols = HashSet::new();
    let mut markers = 0usize;

    for (i, entry) in entries.iter().enumerate() {
        if entry.symbol.is_empty() {
            return Err(ConcatError::Config(format!(
                "entry '{}' has an empty symbol",
                entry.name
            )));
        }
        if entry.name.is_empty()
            || entry.name.contains(['/', '\\'])
            || entry.name.starts_with('.')
        {
            return Err(ConcatError::Config(format!(
                "entry {i} has an unusable name {:?}",
                entry.name
            )));
        }
        if !names.insert(entry.name.as_str()) {
            return Err(ConcatError::Config(format!(
                "duplicate name '{}'",
                entry.name
            )));
        }
        if !symbols.insert(entry.symbol.as_str()) {
            return Err(ConcatError::Config(format!(
                "duplicate symbol {:?}",
                entry.symbol
            )));
        }
        if entry.kind == PhonemeKind::StressMarker {
            markers += 1;
        }
        if entry.kind == PhonemeKind::StressedVowel
            && entries.get(i + 1).map(|next| next.kind) != Some(PhonemeKind::Vowel)
        {
            return Err(ConcatError::Config(format!(
                "stressed vowel '{}' must directly precede its unstressed vowel",
                entry.name
            )));
        }
    }

    if markers > 1 {
        return Err(ConcatError::Config(format!(
            "expected at most one stress marker, found {markers}"
        )));
    }
    Ok(())
}

/// Load a symbol table from a JSON file.
///
/// The file must contain a `"symbols"` array of
/// `{"name": ..., "symbol": ..., "kind": ...}` objects in identifier order.
pub fn load_symbols(path: &Path) -> Result<SymbolTable, ConcatError> {
    let content = std::fs::read_to_string(path)?;
    let file: SymbolFile = serde_json::from_str(&content)
        .map_err(|e| ConcatError::Config(format!("Failed to parse JSON: {e}")))?;
    SymbolTable::new(file.symbols)
}

/// Built-in Standard German inventory.
///
/// Names double as clip file names and follow the keyword convention of the
/// recorded library (`aale.wav` holds the vowel of "Aale").
pub fn hardcoded_symbols() -> SymbolTable {
    use PhonemeKind::*;

    let entries: &[(&str, &str, PhonemeKind)] = &[
        ("ei_stressed", "ˈaɪ", StressedVowel),
        ("ei", "aɪ", Vowel),
        ("au_stressed", "ˈaʊ", StressedVowel),
        ("au", "aʊ", Vowel),
        ("aale_stressed", "ˈaː", StressedVowel),
        ("aale", "aː", Vowel),
        ("assel_stressed", "ˈa", StressedVowel),
        ("assel", "a", Vowel),
        ("besser", "ɐ", Vowel),
        ("bass", "b", Consonant),
        ("chemie", "ç", Consonant),
        ("docht", "d", Consonant),
        ("eber_stressed", "ˈeː", StressedVowel),
        ("eber", "eː", Vowel),
        ("egoist_stressed", "ˈe", StressedVowel),
        ("egoist", "e", Vowel),
        ("aehre_stressed", "ˈɛː", StressedVowel),
        ("aehre", "ɛː", Vowel),
        ("etwas_stressed", "ˈɛ", StressedVowel),
        ("etwas", "ɛ", Vowel),
        ("schwa", "ə", Vowel),
        ("viel", "f", Consonant),
        ("geld", "ɡ", Consonant),
        ("hase", "h", Consonant),
        ("ihm_stressed", "ˈiː", StressedVowel),
        ("ihm", "iː", Vowel),
        ("imitat_stressed", "ˈi", StressedVowel),
        ("imitat", "i", Vowel),
        ("innen_stressed", "ˈɪ", StressedVowel),
        ("innen", "ɪ", Vowel),
        ("jeder", "j", Consonant),
        ("kiel", "k", Consonant),
        ("last", "l", Consonant),
        ("made", "m", Consonant),
        ("ng", "ŋ", Consonant),
        ("name", "n", Consonant),
        ("oetztal_stressed", "ˈœ", StressedVowel),
        ("oetztal", "œ", Vowel),
        ("ober_stressed", "ˈoː", StressedVowel),
        ("ober", "oː", Vowel),
        ("obelisk_stressed", "ˈo", StressedVowel),
        ("obelisk", "o", Vowel),
        ("eule_stressed", "ˈɔʏ", StressedVowel),
        ("eule", "ɔʏ", Vowel),
        ("ordnung_stressed", "ˈɔ", StressedVowel),
        ("ordnung", "ɔ", Vowel),
        ("oel_stressed", "ˈøː", StressedVowel),
        ("oel", "øː", Vowel),
        ("pfote", "pf", Consonant),
        ("puppe", "p", Consonant),
        ("rose", "ʁ", Consonant),
        ("skopus", "s", Consonant),
        ("schwere", "ʃ", Consonant),
        ("tschechisch", "tʃ", Consonant),
        ("zwiebel", "ts", Consonant),
        ("takt", "t", Consonant),
        ("uhu_stressed", "ˈuː", StressedVowel),
        ("uhu", "uː", Vowel),
        ("ukulele_stressed", "ˈu", StressedVowel),
        ("ukulele", "u", Vowel),
        ("butt_stressed", "ˈʊ", StressedVowel),
        ("butt", "ʊ", Vowel),
        ("weit", "v", Consonant),
        ("nacht", "x", Consonant),
        ("ueber_stressed", "ˈyː", StressedVowel),
        ("ueber", "yː", Vowel),
        ("buero_stressed", "ˈy", StressedVowel),
        ("buero", "y", Vowel),
        ("uecker_stressed", "ˈʏ", StressedVowel),
        ("uecker", "ʏ", Vowel),
        ("sahne", "z", Consonant),
        ("space", " ", WordBoundary),
        ("dot", ".", SentencePause),
        ("comma", ",", ClausePause),
        ("stress", "ˈ", StressMarker),
    ];

    SymbolTable::build(
        entries
            .iter()
            .map(|&(name, symbol, kind)| SymbolEntry {
                name: name.to_string(),
                symbol: symbol.to_string(),
                kind,
            })
            .collect(),
    )
}
