use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::{tempdir, TempDir};

const RESULTS_DOC: &str = r#"{
    "count": 5,
    "results": [{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}, {"id": 5}]
}"#;

#[allow(deprecated)]
fn chunkstream(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chunkstream").expect("binary");
    cmd.current_dir(workdir.path())
        .env_remove("CHUNKSTREAM_CHUNK_SIZE")
        .env_remove("CHUNKSTREAM_PATH")
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout_chunks(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}

#[test]
fn json_results_default_to_pairs() {
    let temp = tempdir().unwrap();
    chunkstream(&temp)
        .arg("json")
        .write_stdin(RESULTS_DOC)
        .assert()
        .success()
        .stdout("[{\"id\":1},{\"id\":2}]\n[{\"id\":3},{\"id\":4}]\n[{\"id\":5}]\n");
}

#[test]
fn json_file_with_explicit_path_and_size() {
    let temp = tempdir().unwrap();
    let doc = temp.path().join("nested.json");
    fs::write(&doc, r#"{"data": {"items": [1, 2, 3, 4, 5, 6, 7]}}"#).unwrap();

    let output = chunkstream(&temp)
        .args(["json", "--path", "data.items", "-k", "3"])
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_chunks(&output.stdout),
        vec![
            serde_json::json!([1, 2, 3]),
            serde_json::json!([4, 5, 6]),
            serde_json::json!([7]),
        ]
    );
}

#[test]
fn zero_chunk_size_is_rejected() {
    let temp = tempdir().unwrap();
    chunkstream(&temp)
        .args(["lines", "--chunk-size", "0"])
        .write_stdin("a\nb\n")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn negative_chunk_size_is_rejected() {
    let temp = tempdir().unwrap();
    chunkstream(&temp)
        .args(["lines", "-k", "-2"])
        .write_stdin("a\nb\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_size must be >= 1, got -2"));
}

#[test]
fn lines_from_file() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("words.txt");
    fs::write(&input, "alpha\nbeta\ngamma\ndelta\n").unwrap();

    chunkstream(&temp)
        .args(["lines", "-k", "3"])
        .arg(&input)
        .assert()
        .success()
        .stdout("[\"alpha\",\"beta\",\"gamma\"]\n[\"delta\"]\n");
}

#[test]
fn ndjson_with_limit() {
    let temp = tempdir().unwrap();
    chunkstream(&temp)
        .args(["ndjson", "--limit", "1", "-k", "2"])
        .write_stdin("{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n")
        .assert()
        .success()
        .stdout("[{\"n\":1},{\"n\":2}]\n");
}

#[test]
fn env_overrides_config_file_and_flag_overrides_env() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("chunkstream.toml"), "chunk_size = 4\n").unwrap();

    chunkstream(&temp)
        .arg("lines")
        .write_stdin("1\n2\n3\n4\n5\n")
        .assert()
        .success()
        .stdout("[\"1\",\"2\",\"3\",\"4\"]\n[\"5\"]\n");

    chunkstream(&temp)
        .arg("lines")
        .env("CHUNKSTREAM_CHUNK_SIZE", "3")
        .write_stdin("1\n2\n3\n4\n5\n")
        .assert()
        .success()
        .stdout("[\"1\",\"2\",\"3\"]\n[\"4\",\"5\"]\n");

    chunkstream(&temp)
        .args(["lines", "-k", "5"])
        .env("CHUNKSTREAM_CHUNK_SIZE", "3")
        .write_stdin("1\n2\n3\n4\n5\n")
        .assert()
        .success()
        .stdout("[\"1\",\"2\",\"3\",\"4\",\"5\"]\n");
}

#[test]
fn explicit_config_sets_path_and_pretty() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("custom.toml");
    fs::write(&config, "path = \"rows\"\npretty = true\nchunk_size = 1\n").unwrap();

    chunkstream(&temp)
        .arg("--config")
        .arg(&config)
        .arg("json")
        .write_stdin(r#"{"rows": [true]}"#)
        .assert()
        .success()
        .stdout("[\n  true\n]\n");
}

#[test]
fn malformed_document_fails_after_earlier_chunks() {
    let temp = tempdir().unwrap();
    chunkstream(&temp)
        .args(["json", "-k", "2"])
        .write_stdin(r#"{"results": [1, 2, 3 4]}"#)
        .assert()
        .failure()
        .stdout("[1,2]\n[3")
        .stderr(predicate::str::contains("Syntax error"));
}

#[test]
fn missing_path_is_reported() {
    let temp = tempdir().unwrap();
    chunkstream(&temp)
        .args(["json", "--path", "missing"])
        .write_stdin(RESULTS_DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found: missing"));
}
