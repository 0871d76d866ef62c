use super::model::ConcatError;
use super::symbols::{PhonemeId, PhonemeKind, SymbolTable};

/// How a stress marker in front of a consonant is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StressPolicy {
    /// Stress must land on the very next symbol, which has to be a vowel.
    #[default]
    Strict,
    /// Consonants pass through and the stress waits for the next vowel.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StressState {
    Idle,
    Pending { marker_offset: usize },
}

/// Split a transcription into phoneme identifiers.
///
/// Symbols are matched greedily at each byte offset in the table's match
/// order. A stress marker emits nothing; it turns the following vowel into
/// its stressed variant.
pub fn tokenize(
    text: &str,
    symbols: &SymbolTable,
    policy: StressPolicy,
) -> Result<Vec<PhonemeId>, ConcatError> {
    let mut transcript = Vec::with_capacity(text.len());
    let mut state = StressState::Idle;
    let mut offset = 0usize;

    while offset < text.len() {
        let id = symbols
            .match_at(text, offset)
            .ok_or_else(|| ConcatError::UnknownSymbol {
                offset,
                symbol: text[offset..].chars().next().unwrap_or_default(),
            })?;

        let (next, emitted) = step(state, id, offset, symbols, policy)?;
        if let Some(emitted) = emitted {
            transcript.push(emitted);
        }
        state = next;
        offset += symbols.entry(id).symbol.len();
    }

    if let StressState::Pending { marker_offset } = state {
        return Err(ConcatError::UnterminatedStress {
            offset: marker_offset,
        });
    }

    log::debug!(
        "Tokenized {} bytes into {} phonemes",
        text.len(),
        transcript.len()
    );
    Ok(transcript)
}

fn step(
    state: StressState,
    id: PhonemeId,
    offset: usize,
    symbols: &SymbolTable,
    policy: StressPolicy,
) -> Result<(StressState, Option<PhonemeId>), ConcatError> {
    let entry = symbols.entry(id);

    let marker_offset = match state {
        StressState::Idle if entry.kind == PhonemeKind::StressMarker => {
            return Ok((StressState::Pending { marker_offset: offset }, None));
        }
        StressState::Idle => return Ok((StressState::Idle, Some(id))),
        StressState::Pending { marker_offset } => marker_offset,
    };

    match entry.kind {
        PhonemeKind::Vowel => match symbols.stressed_variant(id) {
            Some(stressed) => Ok((StressState::Idle, Some(stressed))),
            None => Err(ConcatError::StressNotOnVowel {
                offset: marker_offset,
                found: entry.symbol.clone(),
            }),
        },
        kind if kind.is_silence() => Err(ConcatError::StressBeforeBoundary {
            offset: marker_offset,
            found: entry.symbol.clone(),
        }),
        PhonemeKind::Consonant if policy == StressPolicy::Lenient => {
            Ok((StressState::Pending { marker_offset }, Some(id)))
        }
        _ => Err(ConcatError::StressNotOnVowel {
            offset: marker_offset,
            found: entry.symbol.clone(),
        }),
    }
}
