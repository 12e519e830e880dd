//! Runs against the file-backed host.

use std::fs;
use std::path::Path;

use physical_nets::error::{EngineError, HostError};
use physical_nets::host::{BoardHost, FileHost};
use physical_nets::netlist::find_pin_net;
use physical_nets::pipeline::{run, RunOptions};
use serde_json::{json, Value};
use tempfile::TempDir;

const BOARD: &str = r#"["ATTR","a1",0,"c1",1,0,0,"Designator","U1"]
["PAD_NET","c1","1",0,"e1"]
["PAD_NET","c1","2",0,"e2"]
["LINE","t1",0,"",1,0,0,50,0,2]"#;

const PADS: &str = r#"[
  {"primitiveId": "c1e1", "layer": 1, "x": 0, "y": 0, "pad": ["RECT", 10, 10]},
  {"id": "c1e2", "layer": "1", "x": "50", "y": 0, "pad": ["ROUND", 8]}
]"#;

fn netlist() -> Value {
    json!({
        "c1": {"props": {"Designator": "U1"}, "pins": {"1": "", "2": ""}, "extra": [1, 2, 3]}
    })
}

fn setup(source: &[u8]) -> (TempDir, FileHost) {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("board.txt");
    let netlist_path = dir.path().join("netlist.json");
    let pads_path = dir.path().join("pads.json");
    fs::write(&source_path, source).unwrap();
    fs::write(&netlist_path, netlist().to_string()).unwrap();
    fs::write(&pads_path, PADS).unwrap();
    let host = FileHost::new(&source_path, &netlist_path).with_pads(&pads_path);
    (dir, host)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn patches_the_netlist_in_place() {
    let (dir, mut host) = setup(BOARD.as_bytes());

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(report.change_count(), 2);
    assert!(report.written);
    let written = read_json(&dir.path().join("netlist.json"));
    assert_eq!(find_pin_net(&written, "U1", "1"), Some("NET1"));
    assert_eq!(find_pin_net(&written, "U1", "2"), Some("NET1"));
    assert_eq!(written["c1"]["extra"], json!([1, 2, 3]));
    assert!(!dir.path().join("netlist.json.tmp").exists());
}

#[tokio::test]
async fn separate_output_leaves_the_input_alone() {
    let (dir, host) = setup(BOARD.as_bytes());
    let output = dir.path().join("patched.json");
    let mut host = host.with_output(&output);

    run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(read_json(&dir.path().join("netlist.json")), netlist());
    assert_eq!(find_pin_net(&read_json(&output), "U1", "1"), Some("NET1"));
}

#[tokio::test]
async fn byte_order_mark_is_ignored() {
    let mut source = b"\xEF\xBB\xBF".to_vec();
    source.extend_from_slice(BOARD.as_bytes());
    let (_dir, mut host) = setup(&source);

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(report.outcome.parse.malformed, 0);
    assert_eq!(report.change_count(), 2);
}

#[tokio::test]
async fn missing_pads_file_means_no_pads() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("board.txt");
    fs::write(&source_path, BOARD).unwrap();
    let mut host = FileHost::new(&source_path, dir.path().join("netlist.json"));

    assert!(host.all_pads().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_netlist_is_a_host_error() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("board.txt");
    fs::write(&source_path, BOARD).unwrap();
    let mut host = FileHost::new(&source_path, dir.path().join("absent.json"));

    let err = run(&mut host, &RunOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Host {
            operation: "netlist_document",
            source: HostError::Io { .. }
        }
    ));
}

#[tokio::test]
async fn malformed_pads_are_a_json_error() {
    let (dir, mut host) = setup(BOARD.as_bytes());
    fs::write(dir.path().join("pads.json"), "[{").unwrap();

    let err = host.all_pads().await.unwrap_err();

    assert!(matches!(err, HostError::Json { .. }));
}
