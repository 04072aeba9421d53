use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

const TEI: &str = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text><body><div type="edition">
    <ab>abc<supplied reason="lost">def</supplied>ghi<lb/>jk<supplied reason="illegible">l</supplied></ab>
    <ab>x<span>y</span>z</ab>
  </div></body></text>
</TEI>"#;

fn tei_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn maat(args: &[&str], input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_maat"))
        .args(args)
        .arg(input)
        .env_remove("MAAT_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_convert() {
    let file = tei_file(TEI);
    let output = maat(&["convert"], file.path());

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "<ab>abc<supplied>def</supplied>ghi\njk<supplied>l</supplied></ab>\n<ab>xyz</ab>\n"
    );
    assert!(stderr(&output).contains("no handler for <span>"));
}

#[test]
fn test_convert_strict_fails() {
    let file = tei_file(TEI);
    let output = maat(&["convert", "--strict"], file.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("no handler for <span>"));
}

#[test]
fn test_train() {
    let file = tei_file(TEI);
    let output = maat(&["train"], file.path());

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "abc[def]ghi\njk[l]\nxyz\n");
}

#[test]
fn test_cases_text() {
    let file = tei_file(TEI);
    let output = maat(&["cases"], file.path());

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "abc[...]ghi\njkl\nabcdefghi\njk[.]\n"
    );
}

#[test]
fn test_cases_json_evaluation() {
    let file = tei_file(TEI);
    let output = maat(&["cases", "--format", "json", "--evaluation"], file.path());

    assert!(output.status.success(), "{}", stderr(&output));
    let records: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(
        records,
        [
            serde_json::json!({
                "block": 0,
                "index": 0,
                "text": "abc[...]ghi\njk.",
                "mask_len": 3,
                "alternatives": ["def"],
            }),
            serde_json::json!({
                "block": 0,
                "index": 1,
                "text": "abc...ghi\njk[.]",
                "mask_len": 1,
                "alternatives": ["l"],
            }),
        ]
    );
}

#[test]
fn test_config_file() {
    let file = tei_file("<doc><div>a<supplied reason=\"lost\">b</supplied></div></doc>");
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config
        .write_all(br#"{"select": "div", "format": "json"}"#)
        .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_maat"))
        .arg("cases")
        .arg(file.path())
        .env("MAAT_CONFIG", config.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "{\"block\":0,\"index\":0,\"text\":\"a[.]\"}\n"
    );
}

#[test]
fn test_bad_config_names_field() {
    let file = tei_file(TEI);
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config.write_all(br#"{"strict": "yes"}"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_maat"))
        .arg("convert")
        .arg(file.path())
        .env("MAAT_CONFIG", config.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("strict"), "{}", stderr(&output));
}

#[test]
fn test_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_maat"))
        .arg("-V")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("maat "));
}
