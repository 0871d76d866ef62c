use std::path::Path;

use phoneme_splice::engines::concat::{
    ConcatEngine, ConcatInferenceParams, ConcatModelParamsBuilder, SilenceDurations, StressPolicy,
};
use phoneme_splice::SynthesisEngine;

fn write_clip(dir: &Path, name: &str, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(dir.join(format!("{name}.wav")), spec).expect("create clip");
    for &s in samples {
        writer.write_sample(s).expect("write sample");
    }
    writer.finalize().expect("finalize clip");
}

fn read_output(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).expect("open output");
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("read samples");
    (spec, samples)
}

#[test]
fn synthesizes_transcription_from_clip_directory() {
    let clips = tempfile::tempdir().expect("tempdir");
    write_clip(clips.path(), "made", 48000, &[1, 2, 3]);
    write_clip(clips.path(), "aale", 48000, &[100, -100]);
    write_clip(clips.path(), "aale_stressed", 48000, &[500, -500, 500]);

    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("out.wav");

    let mut engine = ConcatEngine::new();
    engine.load_model(clips.path()).expect("load clips");
    engine
        .synthesize_to_file("maː mˈaː.", &output, None)
        .expect("synthesize");

    let (spec, samples) = read_output(&output);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 16);

    let mut expected = vec![1, 2, 3, 100, -100];
    expected.extend(std::iter::repeat(0).take(160));
    expected.extend([1, 2, 3, 500, -500, 500]);
    expected.extend(std::iter::repeat(0).take(320));
    assert_eq!(samples, expected);
}

#[test]
fn invalid_clip_produces_no_output() {
    let clips = tempfile::tempdir().expect("tempdir");
    write_clip(clips.path(), "made", 44100, &[1, 2, 3]);

    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("out.wav");

    let mut engine = ConcatEngine::new();
    engine.load_model(clips.path()).expect("load clips");
    let err = engine
        .synthesize_to_file("m", &output, None)
        .expect_err("44.1 kHz clip must be rejected");
    assert!(err.to_string().contains("made.wav"), "{err}");
    assert!(!output.exists());
}

#[test]
fn tokenization_error_produces_no_output() {
    let clips = tempfile::tempdir().expect("tempdir");
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("out.wav");

    let mut engine = ConcatEngine::new();
    engine.load_model(clips.path()).expect("load clips");
    let err = engine
        .synthesize_to_file("ˈ ", &output, None)
        .expect_err("stress before boundary");
    assert!(err.to_string().contains("byte offset 0"), "{err}");
    assert!(!output.exists());
}

#[test]
fn symbols_json_in_clip_directory_replaces_builtin_table() {
    let clips = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        clips.path().join("symbols.json"),
        r#"{"symbols": [
            {"name": "ka", "symbol": "k", "kind": "consonant"},
            {"name": "o_stressed", "symbol": "ó", "kind": "stressed_vowel"},
            {"name": "o", "symbol": "o", "kind": "vowel"},
            {"name": "gap", "symbol": "_", "kind": "word_boundary"},
            {"name": "accent", "symbol": "'", "kind": "stress_marker"}
        ]}"#,
    )
    .expect("write symbols.json");
    write_clip(clips.path(), "ka", 48000, &[9]);
    write_clip(clips.path(), "o_stressed", 48000, &[7, 7]);

    let mut engine = ConcatEngine::new();
    engine.load_model(clips.path()).expect("load clips");
    assert_eq!(engine.list_phonemes(), vec!["ka", "o_stressed", "o", "gap", "accent"]);

    let params = ConcatInferenceParams {
        stress_policy: StressPolicy::Lenient,
    };
    let result = engine
        .synthesize("'k_", Some(params.clone()))
        .expect_err("boundary after stressed consonant")
        .to_string();
    assert!(result.contains("pause"), "{result}");

    let result = engine.synthesize("'ko", Some(params)).expect("synthesize");
    assert_eq!(result.samples, vec![9, 7, 7]);
}

#[test]
fn custom_silence_durations() {
    let clips = tempfile::tempdir().expect("tempdir");
    let params = ConcatModelParamsBuilder::default()
        .silence(SilenceDurations {
            word_boundary_ms: 1.0,
            sentence_pause_ms: 100.0,
            clause_pause_ms: 20.0,
        })
        .build()
        .expect("params");

    let mut engine = ConcatEngine::new();
    engine
        .load_model_with_params(clips.path(), params)
        .expect("load clips");
    let result = engine.synthesize(" ,.", None).expect("synthesize");
    assert_eq!(result.samples.len(), 48 + 960 + 4800);
    assert!((result.duration_secs() - 0.121).abs() < 1e-9);
}
