//! End-to-end tests for the rollcli binary.

use assert_cmd::Command;
use predicates::prelude::*;
use rollcodec::{read_midi, write_midi, MidiExportOptions, MidiNote, Token};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn rollcli(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rollcli").unwrap();
    cmd.arg("--config").arg(config);
    cmd.env_remove("ROLLCODEC_SCHEME");
    cmd.env_remove("ROLLCODEC_STEPS_PER_BAR");
    cmd
}

fn workspace(config: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollcodec.toml");
    fs::write(&path, config).unwrap();
    (dir, path)
}

#[test]
fn encodes_wire_document_to_stdout() {
    let (dir, config) = workspace("[codec]\nscheme = \"delta\"\n");
    let input = dir.path().join("input.json");
    fs::write(
        &input,
        r#"[{"value": 60, "time": 24, "length": 12, "velocity": 0.5}]"#,
    )
    .unwrap();

    // shift 2, velocity 50, value 60, length 1
    rollcli(&config)
        .arg("encode")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("[194,306,60,129]"));
}

#[test]
fn midi_round_trip_on_the_grid() {
    let (dir, config) = workspace("[codec]\nscheme = \"grid\"\nsteps_per_bar = 8\n");
    let notes = vec![
        MidiNote::new(60, 0.0, 0.25, 100),
        MidiNote::new(64, 0.5, 1.0, 100),
    ];
    let midi_in = dir.path().join("in.mid");
    let tokens = dir.path().join("tokens.json");
    let midi_out = dir.path().join("out.mid");
    fs::write(&midi_in, write_midi(&notes, &MidiExportOptions::default())).unwrap();

    rollcli(&config)
        .arg("encode")
        .arg(&midi_in)
        .arg("--output")
        .arg(&tokens)
        .assert()
        .success();

    let encoded: Vec<Token> = serde_json::from_str(&fs::read_to_string(&tokens).unwrap()).unwrap();
    assert_eq!(encoded, vec![60 * 8 + 1, 0, 0, 64 * 8 + 1 + 1]);

    rollcli(&config)
        .arg("decode")
        .arg(&tokens)
        .arg("--output")
        .arg(&midi_out)
        .assert()
        .success();

    let decoded = read_midi(&fs::read(&midi_out).unwrap()).unwrap();
    assert_eq!(decoded, notes);
}

#[test]
fn scheme_flag_overrides_config() {
    let (dir, config) = workspace("[codec]\nscheme = \"grid\"\n");
    let input = dir.path().join("input.json");
    fs::write(
        &input,
        r#"[{"value": 60, "time": 0, "length": 12, "velocity": 0.0}]"#,
    )
    .unwrap();

    rollcli(&config)
        .arg("encode")
        .arg(&input)
        .arg("--scheme")
        .arg("delta")
        .assert()
        .success()
        .stdout(predicate::str::contains("[60,129]"));
}

#[test]
fn decodes_to_wire_document() {
    let (dir, config) = workspace("[codec]\nscheme = \"delta\"\n");
    let tokens = dir.path().join("tokens.json");
    let out = dir.path().join("out.json");
    fs::write(&tokens, "[194, 306, 60, 129, 999]").unwrap();

    rollcli(&config)
        .arg("decode")
        .arg(&tokens)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        doc,
        serde_json::json!([{"value": 60, "time": 24, "length": 12, "velocity": 0.5}])
    );
}

#[test]
fn rejects_non_list_wire_document() {
    let (dir, config) = workspace("");
    let input = dir.path().join("input.json");
    fs::write(&input, r#"{"notes": []}"#).unwrap();

    rollcli(&config)
        .arg("encode")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("list of note objects"));
}

#[test]
fn rejects_zero_resolution() {
    let (dir, config) = workspace("[codec]\nsteps_per_bar = 0\n");
    let input = dir.path().join("input.json");
    fs::write(&input, "[]").unwrap();

    rollcli(&config)
        .arg("encode")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("steps_per_bar"));
}

#[test]
fn preprocess_tokenizes_directory() {
    let (dir, config) = workspace("[codec]\nscheme = \"delta\"\n");
    let midi_dir = dir.path().join("midi");
    let out_dir = dir.path().join("tokens");
    fs::create_dir_all(&midi_dir).unwrap();
    let notes = vec![MidiNote::new(60, 0.0, 0.5, 100)];
    fs::write(
        midi_dir.join("song.mid"),
        write_midi(&notes, &MidiExportOptions::default()),
    )
    .unwrap();

    rollcli(&config)
        .arg("preprocess")
        .arg(&midi_dir)
        .arg(&out_dir)
        .assert()
        .success();

    assert!(out_dir.join("song.mid.tokens.json").exists());
}

#[test]
fn config_command_prints_effective_toml() {
    let (_dir, config) = workspace("[codec]\nscheme = \"grid\"\nsteps_per_bar = 16\n");

    rollcli(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("scheme = \"grid\""))
        .stdout(predicate::str::contains("steps_per_bar = 16"));
}

#[test]
fn missing_config_file_is_warned_about() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    rollcli(&missing)
        .env("ROLLCODEC_LOG_LEVEL", "warn")
        .env_remove("RUST_LOG")
        .arg("config")
        .assert()
        .success()
        .stderr(predicate::str::contains("config file not found"));
}
