//! End-to-end runs of the `doctpl` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use doctpl_test::{DocxBuilder, DocxInspector, Paragraph};
use predicates::prelude::*;
use tempfile::TempDir;

const LEXICON: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../doctpl-render/tests/fixtures/lexicon.yaml"
);

const SCHEMA: &str = r#"
title: Доверенность
grouped_fields:
  - name: Сотрудник
    fields:
      - { tag: fio, name: ФИО сотрудника, hint: Полностью, type: text, length: 100 }
ungrouped_fields:
  - { tag: days, name: Срок, type: number, length: 3, default: "10" }
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        let template = DocxBuilder::new()
            .paragraph(
                Paragraph::new()
                    .text("Выдана ")
                    .tag("{{ fio | dative }}")
                    .text(" на ")
                    .tag("{{ da")
                    .tag("ys }}")
                    .text(" дней"),
            )
            .build();
        ws.write("template.docx", &template);
        ws.write("schema.yaml", SCHEMA.as_bytes());
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn doctpl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_doctpl"));
        cmd.current_dir(self.dir.path());
        cmd
    }

    fn inspect(&self, name: &str) -> DocxInspector {
        DocxInspector::open(&fs::read(self.path(name)).unwrap())
    }
}

fn lexicon_config(ws: &Workspace) -> PathBuf {
    ws.write(
        "doctpl.toml",
        format!("[lexicon]\npath = \"{}\"\n", Path::new(LEXICON).display()).as_bytes(),
    )
}

#[test]
fn test_tags_lists_each_tag_once() {
    let ws = Workspace::new();
    ws.doctpl()
        .args(["tags", "template.docx"])
        .assert()
        .success()
        .stdout("days\nfio\n");
}

#[test]
fn test_render_with_lexicon_from_local_config() {
    let ws = Workspace::new();
    lexicon_config(&ws);
    ws.write("ctx.yaml", "fio: Иванов Иван Петрович\ndays: 14\n".as_bytes());

    ws.doctpl()
        .args(["render", "template.docx", "-c", "ctx.yaml", "-o", "out.docx"])
        .assert()
        .success();
    assert_eq!(
        ws.inspect("out.docx").text(),
        "Выдана Иванову Ивану Петровичу на 14 дней"
    );
}

#[test]
fn test_render_reads_json_contexts() {
    let ws = Workspace::new();
    ws.write("ctx.json", r#"{"fio": "Петров", "days": "3"}"#.as_bytes());
    ws.doctpl()
        .args(["render", "template.docx", "--context", "ctx.json", "--output", "out.docx"])
        .assert()
        .success();
    assert_eq!(ws.inspect("out.docx").text(), "Выдана Петров на 3 дней");
}

#[test]
fn test_draft_names_output_after_schema_title() {
    let ws = Workspace::new();
    ws.doctpl()
        .args(["draft", "template.docx", "-s", "schema.yaml", "--highlight", "green"])
        .assert()
        .success();

    let out = ws.inspect("Доверенность_шаблон.docx");
    assert_eq!(out.text(), "Выдана ФИО сотрудника на Срок дней");
    let highlighted: Vec<_> = out
        .runs()
        .into_iter()
        .filter(|r| r.highlight.as_deref() == Some("green"))
        .map(|r| r.text)
        .collect();
    assert_eq!(highlighted, vec!["ФИО сотрудника", "Срок"]);
}

#[test]
fn test_preview_drops_empty_values_and_marks_defaults() {
    let ws = Workspace::new();
    ws.write("ctx.yaml", "fio: Петров\ndays: \"\"\n".as_bytes());
    ws.doctpl()
        .args(["preview", "template.docx", "-s", "schema.yaml", "-c", "ctx.yaml"])
        .assert()
        .success();

    let out = ws.inspect("Доверенность_preview.docx");
    assert_eq!(out.text(), "Выдана Петров на 10 дней");
    assert_eq!(out.highlighted(), vec!["10"]);
}

#[test]
fn test_check_reports_both_directions() {
    let ws = Workspace::new();
    ws.write(
        "schema.yaml",
        "title: T\nungrouped_fields:\n  - { tag: days, name: Срок }\n  - { tag: boss, name: Руководитель }\n"
            .as_bytes(),
    );
    let output = ws
        .doctpl()
        .args(["check", "template.docx", "-s", "schema.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["errors"][0]["tags"], serde_json::json!(["fio"]));
    assert_eq!(report["errors"][1]["tags"], serde_json::json!(["boss"]));

    ws.doctpl()
        .args(["check", "template.docx", "-s", "schema.yaml", "--strict"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn test_check_consistent_template() {
    let ws = Workspace::new();
    ws.doctpl()
        .args(["check", "template.docx", "--schema", "schema.yaml", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent"));
}

#[test]
fn test_prepare_rewrites_in_place() {
    let ws = Workspace::new();
    ws.doctpl()
        .args(["prepare", "template.docx"])
        .assert()
        .success();
    let texts: Vec<String> = ws
        .inspect("template.docx")
        .runs()
        .into_iter()
        .map(|r| r.text)
        .collect();
    assert!(texts.contains(&"{{ days }}".to_string()));
}

#[test]
fn test_render_to_pdf_through_configured_office() {
    let ws = Workspace::new();
    let script = ws.write(
        "fake-soffice",
        br#"while [ "$#" -gt 0 ] && [ "$1" != "--outdir" ]; do shift; done
name=$(basename "$3")
printf '%%PDF-fake' > "$2/${name%.*}.pdf"
"#,
    );
    let config = ws.write(
        "custom.toml",
        format!("[convert]\ncommand = [\"sh\", \"{}\"]\n", script.display()).as_bytes(),
    );
    ws.write("ctx.yaml", b"fio: x\ndays: 1\n");

    ws.doctpl()
        .arg("--config")
        .arg(&config)
        .args(["render", "template.docx", "-c", "ctx.yaml", "-o", "out.pdf", "--pdf"])
        .assert()
        .success();
    assert_eq!(fs::read(ws.path("out.pdf")).unwrap(), b"%PDF-fake");
}

#[test]
fn test_failing_office_exits_with_error() {
    let ws = Workspace::new();
    let config = ws.write("custom.toml", b"[convert]\ncommand = [\"false\"]\n");
    ws.doctpl()
        .arg("--config")
        .arg(&config)
        .args(["draft", "template.docx", "-s", "schema.yaml", "--pdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PDF conversion failed"));
}

#[test]
fn test_missing_template_is_an_error() {
    let ws = Workspace::new();
    ws.doctpl()
        .args(["tags", "nope.docx"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read template"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let ws = Workspace::new();
    ws.doctpl()
        .args(["--config", "absent.toml", "tags", "template.docx"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
}
