//! CLI integration tests for kalima
//!
//! Runs the kalima binary end-to-end using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SNAPSHOT: &str = r##"{
  "units": [
    {"id": 1, "code": "A", "name": "Animals", "color": "#f97316", "sort_order": 1},
    {"id": 2, "code": "J", "name": "Opposites", "color": "#ef4444", "sort_order": 2}
  ],
  "sub_themes": [
    {"id": 10, "unit_id": 1, "label": "Birds", "sort_order": 1},
    {"id": 20, "unit_id": 2, "label": "Light and dark", "sort_order": 1}
  ],
  "words": [
    {"id": 1, "arabic": "طَيْر", "transliteration": "tayr", "gloss": "birds", "root_id": 7, "difficulty": 2},
    {"id": 2, "arabic": "طَائِر", "transliteration": "ta'ir", "gloss": "a bird", "root_id": 7, "difficulty": 2},
    {"id": 3, "arabic": "نُور", "transliteration": "nur", "gloss": "light"},
    {"id": 4, "arabic": "ظُلُمَات", "transliteration": "zulumat", "gloss": "darkness"}
  ],
  "word_themes": [
    {"word_id": 1, "sub_theme_id": 10},
    {"word_id": 2, "sub_theme_id": 10},
    {"word_id": 3, "sub_theme_id": 20},
    {"word_id": 4, "sub_theme_id": 20}
  ],
  "relationships": []
}"##;

/// Temp workspace holding an isolated config dir and a snapshot file
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("corpus.json"), SNAPSHOT).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn snapshot(&self) -> PathBuf {
        self.path().join("corpus.json")
    }

    fn database(&self) -> PathBuf {
        self.path().join("data").join("kalima.db")
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("kalima").unwrap();
        cmd.current_dir(self.path());
        cmd.env("KALIMA_CONFIG_DIR", self.path().join("config"));
        cmd.env("RUST_LOG", "off");
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_help_lists_commands() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("overview"))
        .stdout(predicate::str::contains("recommend"))
        .stdout(predicate::str::contains("enrich"));
}

#[test]
fn test_overview_json_from_snapshot() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["overview", "--format", "json", "--snapshot"])
        .arg(ws.snapshot())
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph = stdout_json(&output);
    let nodes = graph["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["id"], "unit-1");
    assert_eq!(nodes[0]["kind"], "unit");
}

#[test]
fn test_unit_text_output() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["unit", "a", "--snapshot"])
        .arg(ws.snapshot())
        .assert()
        .success()
        .stdout(predicate::str::contains("theme-10"))
        .stdout(predicate::str::contains("word-2"));
}

#[test]
fn test_recommend_same_root_first() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["recommend", "1", "--format", "json", "--snapshot"])
        .arg(ws.snapshot())
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    let first = &body["recommendations"].as_array().unwrap()[0];
    assert_eq!(first["word"]["id"], 2);
    let reasons = first["reasons"].as_array().unwrap();
    assert!(reasons.contains(&serde_json::json!("same-ancestry")));
    assert!(reasons.contains(&serde_json::json!("shared-grouping")));
}

#[test]
fn test_recommend_unknown_word_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["recommend", "999", "--snapshot"])
        .arg(ws.snapshot())
        .assert()
        .failure()
        .stderr(predicate::str::contains("999"));
}

#[test]
fn test_search_is_case_insensitive() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["search", "BIRD", "--snapshot"])
        .arg(ws.snapshot())
        .assert()
        .success()
        .stdout(predicate::str::contains("tayr"))
        .stdout(predicate::str::contains("ta'ir"));
}

#[test]
fn test_config_set_get_list_reset() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "graph.theme_mate_cap", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set graph.theme_mate_cap = 5"));

    ws.cmd()
        .args(["config", "get", "graph.theme_mate_cap"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    ws.cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graph.theme_mate_cap = 5"))
        .stdout(predicate::str::contains("recommend.default_limit"));

    ws.cmd().args(["config", "reset"]).assert().success();

    ws.cmd()
        .args(["config", "get", "graph.theme_mate_cap"])
        .assert()
        .success()
        .stdout(predicate::str::diff("20\n"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "set", "graph.nonsense", "1"])
        .assert()
        .failure();
}

#[test]
fn test_import_then_query_database() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["import"])
        .arg(ws.snapshot())
        .arg("--database")
        .arg(ws.database())
        .assert()
        .success()
        .stdout(predicate::str::contains("Words:          4"));

    assert!(ws.database().exists());

    let output = ws
        .cmd()
        .args(["stats", "--format", "json", "--database"])
        .arg(ws.database())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats = stdout_json(&output);
    assert_eq!(stats["words"], 4);
    assert_eq!(stats["units"], 2);

    ws.cmd()
        .args(["word", "3", "--database"])
        .arg(ws.database())
        .assert()
        .success()
        .stdout(predicate::str::contains("word-3"));
}

#[test]
fn test_enrich_writes_output() {
    let ws = Workspace::new();
    let enriched = ws.path().join("enriched.json");

    let output = ws
        .cmd()
        .arg("enrich")
        .arg(ws.snapshot())
        .arg(&enriched)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    // Words 3 and 4 had no difficulty; the J unit pairs them as opposites,
    // and words 1 and 2 share a root
    assert_eq!(report["difficulties_set"], 2);
    assert_eq!(report["relationships_added"], 2);

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&enriched).unwrap()).unwrap();
    let relationships = snapshot["relationships"].as_array().unwrap();
    assert!(relationships.iter().any(|r| r["relationship_type"] == "opposite"
        && r["word_id_1"] == 3
        && r["word_id_2"] == 4));

    // The input is left untouched
    let original = std::fs::read_to_string(ws.snapshot()).unwrap();
    assert_eq!(original, SNAPSHOT);
}

#[test]
fn test_enrich_with_embeddings_seeds_semantic_edges() {
    let ws = Workspace::new();
    let embeddings = ws.path().join("embeddings.json");
    std::fs::write(
        &embeddings,
        r#"[
            {"word_id": 3, "embedding": [1.0, 0.0, 0.2]},
            {"word_id": 4, "embedding": [0.9, 0.1, 0.2]},
            {"word_id": 1, "embedding": [0.0, 1.0, 0.0]}
        ]"#,
    )
    .unwrap();
    let enriched = ws.path().join("enriched.json");

    ws.cmd()
        .arg("enrich")
        .arg(ws.snapshot())
        .arg(&enriched)
        .arg("--embeddings")
        .arg(&embeddings)
        .assert()
        .success()
        .stdout(predicate::str::contains("semantic_similar"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&enriched).unwrap()).unwrap();
    let semantic: Vec<_> = snapshot["relationships"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["relationship_type"] == "semantic_similar")
        .collect();
    assert_eq!(semantic.len(), 1);
    assert_eq!(semantic[0]["word_id_1"], 3);
    assert_eq!(semantic[0]["word_id_2"], 4);
}

#[test]
fn test_enrich_rejects_bad_threshold() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("enrich")
        .arg(ws.snapshot())
        .args(["--similarity-threshold", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("similarity-threshold"));
}
