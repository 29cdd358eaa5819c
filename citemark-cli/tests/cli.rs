use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

#[test]
fn prints_json_segments_for_file() {
    let draft = fixture("系統應支援單一登入(出處: RFP.pdf P.3-5)");
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg(draft.path()).arg("--compact");

    cmd.assert().success().stdout(
        predicate::str::contains(r#""type":"citation""#)
            .and(predicate::str::contains(r#""source_title":"RFP.pdf""#))
            .and(predicate::str::contains(r#""kind":"range","start":3,"end":5"#)),
    );
}

#[test]
fn reads_stdin_and_prints_tags() {
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg("--format")
        .arg("tag")
        .write_stdin("foo(建議實作)bar");

    cmd.assert().success().stdout(
        predicate::str::contains("<text>foo</text>")
            .and(predicate::str::contains(
                "<implementation-badge>(建議實作)</implementation-badge>",
            ))
            .and(predicate::str::contains("<text>bar</text>")),
    );
}

#[test]
fn numbered_output_resolves_sources() {
    let draft = fixture("甲(出處: 需求說明書 P.2)乙(出處: 預算表 P.1)");
    let sources = fixture(r#"[{"id": "s1", "title": "3-需求說明書.docx"}]"#);
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg(draft.path())
        .arg("--format")
        .arg("numbered")
        .arg("--sources")
        .arg(sources.path());

    cmd.assert().success().stdout(
        predicate::str::contains("甲[1]乙[2]")
            .and(predicate::str::contains("[1] 需求說明書 P.2 (s1)"))
            .and(predicate::str::contains("[2] 預算表 P.1 (source not found)")),
    );
}

#[test]
fn multi_source_citation_gets_one_tag_per_source() {
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg("--format")
        .arg("numbered")
        .write_stdin("依據(出處：3-需求說明書.docx P.1, RFP.xlsx P.5)辦理");

    cmd.assert().success().stdout(
        predicate::str::contains("依據[1] [2]辦理")
            .and(predicate::str::contains("[1] 3-需求說明書.docx P.1"))
            .and(predicate::str::contains("[2] RFP.xlsx P.5")),
    );
}

#[test]
fn config_file_changes_marker_syntax() {
    let config = fixture("[markers]\nopen = [\"[\"]\nclose = [\"]\"]\ncitation_labels = [\"source\"]\n");
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg("--config")
        .arg(config.path())
        .arg("--format")
        .arg("tag")
        .write_stdin("see [source: Spec.pdf P.4]");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<ref title=\"Spec.pdf\" pages=\"4\"/>"));
}

#[test]
fn unknown_format_fails() {
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg("--format").arg("yaml").write_stdin("text");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'yaml'"));
}

#[test]
fn missing_input_file_fails() {
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg("/nonexistent/draft.txt");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn lists_formats() {
    let mut cmd = cargo_bin_cmd!("citemark");
    cmd.arg("--list-formats");

    cmd.assert().success().stdout(
        predicate::str::contains("json")
            .and(predicate::str::contains("tag"))
            .and(predicate::str::contains("numbered")),
    );
}
