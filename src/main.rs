use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use phoneme_splice::{
    engines::concat::{ConcatEngine, ConcatInferenceParams, ConcatModelParamsBuilder, StressPolicy},
    SynthesisEngine,
};

/// Splice recorded phoneme clips into speech
#[derive(Debug, Parser)]
#[command(name = "phoneme-splice")]
#[command(about = "Synthesize a WAV file from an IPA transcription using recorded phoneme clips", long_about = None)]
struct Cli {
    /// Transcription file: symbols from the phoneme table, written back to back
    #[arg(value_name = "INFILE")]
    input: PathBuf,

    /// WAV file to write
    #[arg(value_name = "OUTFILE")]
    output: PathBuf,

    /// Directory containing one clip per phoneme
    #[arg(long, value_name = "DIR", default_value = ".")]
    clips: PathBuf,

    /// Symbol table JSON (defaults to DIR/symbols.json, then the built-in table)
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,

    /// Let a stress marker skip consonants until it reaches a vowel
    #[arg(long)]
    lenient_stress: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("Failed to read {}: {e}", cli.input.display()))?;
    // Editors append a final newline; it is not part of the transcription.
    let text = text
        .strip_suffix('\n')
        .map(|t| t.strip_suffix('\r').unwrap_or(t))
        .unwrap_or(&text);

    let mut model_params = ConcatModelParamsBuilder::default();
    if let Some(symbols) = &cli.symbols {
        model_params.symbols_path(symbols.clone());
    }

    let mut engine = ConcatEngine::new();
    engine.load_model_with_params(&cli.clips, model_params.build()?)?;

    let params = ConcatInferenceParams {
        stress_policy: if cli.lenient_stress {
            StressPolicy::Lenient
        } else {
            StressPolicy::Strict
        },
    };

    let start = Instant::now();
    engine.synthesize_to_file(text, &cli.output, Some(params))?;
    log::info!(
        "Synthesized {} in {:.2?}",
        cli.output.display(),
        start.elapsed()
    );
    Ok(())
}
