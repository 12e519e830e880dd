//! End-to-end runs against an in-memory host.

use physical_nets::board::HostPad;
use physical_nets::error::{EngineError, HostError};
use physical_nets::geometry::Point;
use physical_nets::host::{BoardHost, NotifyLevel};
use physical_nets::netlist::find_pin_net;
use physical_nets::pipeline::{run, RunOptions};
use serde_json::{json, Value};

/// Components `R1` (`c1`) and `R2` (`c2`), one pad per pin, plus a via
/// that lands on R2's pad.
const BOARD: &str = r#"["ATTR","a1",0,"c1",1,0,0,"Designator","R1"]
["ATTR","a2",0,"c2",1,0,0,"Designator","R2"]
["PAD_NET","c1","1",0,"e1"]
["PAD_NET","c2","1",0,"e1"]
["VIA","v1",0,"","",45,0,0,20]"#;

#[derive(Debug, Default)]
struct MemoryHost {
    source: String,
    netlist: Value,
    pads: Vec<HostPad>,
    writes: usize,
    notes: Vec<(NotifyLevel, String)>,
    reject_writes: bool,
}

impl MemoryHost {
    fn new(source: &str, pads: Vec<HostPad>) -> Self {
        Self {
            source: source.to_string(),
            netlist: json!({"components": {
                "c1": {"props": {"Designator": "R1"}, "pinInfoMap": {"1": {"net": "", "number": "1"}}},
                "c2": {"props": {"Designator": "R2"}, "pinInfoMap": {"1": {"net": "", "number": "1"}}}
            }}),
            pads,
            ..Self::default()
        }
    }

    fn last_note(&self) -> Option<&(NotifyLevel, String)> {
        self.notes.last()
    }
}

impl BoardHost for MemoryHost {
    async fn document_source(&mut self) -> Result<String, HostError> {
        Ok(self.source.clone())
    }

    async fn netlist_document(&mut self) -> Result<Value, HostError> {
        Ok(self.netlist.clone())
    }

    async fn all_pads(&mut self) -> Result<Vec<HostPad>, HostError> {
        Ok(self.pads.clone())
    }

    async fn set_netlist_document(&mut self, document: &Value) -> Result<(), HostError> {
        if self.reject_writes {
            return Err(HostError::Rejected {
                operation: "set_netlist_document",
                message: "document is locked".to_string(),
            });
        }
        self.writes += 1;
        self.netlist = document.clone();
        Ok(())
    }

    async fn notify(&mut self, level: NotifyLevel, message: &str) {
        self.notes.push((level, message.to_string()));
    }
}

fn scenario_pads() -> Vec<HostPad> {
    vec![
        HostPad::rect("c1e1", 1, Point::new(0.0, 0.0), 30.0, 30.0),
        HostPad::rect("c2e1", 1, Point::new(25.0, 0.0), 30.0, 30.0),
    ]
}

#[tokio::test]
async fn overlapping_pads_and_via_form_one_new_net() {
    let mut host = MemoryHost::new(BOARD, scenario_pads());

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(report.outcome.nets.clusters, 1);
    assert_eq!(report.outcome.nets.minted, vec!["NET1"]);
    assert_eq!(report.change_count(), 2);
    assert!(report.written);
    assert_eq!(host.writes, 1);
    assert_eq!(find_pin_net(&host.netlist, "R1", "1"), Some("NET1"));
    assert_eq!(find_pin_net(&host.netlist, "R2", "1"), Some("NET1"));
    assert_eq!(
        host.netlist["components"]["c1"]["pinInfoMap"]["1"]["number"],
        "1"
    );
    assert!(matches!(host.last_note(), Some((NotifyLevel::Success, _))));
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let mut host = MemoryHost::new(BOARD, scenario_pads());
    run(&mut host, &RunOptions::default()).await.unwrap();
    let patched = host.netlist.clone();

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(report.change_count(), 0);
    assert!(!report.written);
    assert_eq!(host.writes, 1);
    assert_eq!(host.netlist, patched);
    assert!(matches!(host.last_note(), Some((NotifyLevel::Info, _))));
}

#[tokio::test]
async fn input_order_does_not_change_the_result() {
    let mut forward = MemoryHost::new(BOARD, scenario_pads());
    let reversed_source: Vec<&str> = BOARD.lines().rev().collect();
    let mut reversed_pads = scenario_pads();
    reversed_pads.reverse();
    let mut backward = MemoryHost::new(&reversed_source.join("\n"), reversed_pads);

    let a = run(&mut forward, &RunOptions::default()).await.unwrap();
    let b = run(&mut backward, &RunOptions::default()).await.unwrap();

    assert_eq!(a.outcome.nets.assignments, b.outcome.nets.assignments);
    assert_eq!(forward.netlist, backward.netlist);
}

#[tokio::test]
async fn dry_run_reports_without_writing() {
    let mut host = MemoryHost::new(BOARD, scenario_pads());
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let report = run(&mut host, &options).await.unwrap();

    assert_eq!(report.change_count(), 2);
    assert!(!report.written);
    assert_eq!(host.writes, 0);
    assert_eq!(find_pin_net(&host.netlist, "R1", "1"), Some(""));
    let (level, message) = host.last_note().unwrap();
    assert_eq!(*level, NotifyLevel::Info);
    assert!(message.contains("would change"));
}

#[tokio::test]
async fn existing_pad_net_is_kept() {
    let pads = vec![
        HostPad::rect("c1e1", 1, Point::new(0.0, 0.0), 30.0, 30.0).with_net("GND"),
        HostPad::rect("c2e1", 1, Point::new(25.0, 0.0), 30.0, 30.0),
    ];
    let mut host = MemoryHost::new(BOARD, pads);

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert!(report.outcome.nets.minted.is_empty());
    assert_eq!(find_pin_net(&host.netlist, "R1", "1"), Some("GND"));
    assert_eq!(find_pin_net(&host.netlist, "R2", "1"), Some("GND"));
}

#[tokio::test]
async fn separated_pads_are_noise() {
    let pads = vec![
        HostPad::rect("c1e1", 1, Point::new(0.0, 0.0), 30.0, 30.0),
        HostPad::rect("c2e1", 1, Point::new(500.0, 0.0), 30.0, 30.0),
    ];
    let mut host = MemoryHost::new(BOARD, pads);

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(report.change_count(), 0);
    assert!(report.outcome.nets.noise_clusters >= 2);
    assert_eq!(host.writes, 0);
}

#[tokio::test]
async fn empty_source_is_reported_to_the_host() {
    let mut host = MemoryHost::new("", scenario_pads());

    let err = run(&mut host, &RunOptions::default()).await.unwrap_err();

    assert!(matches!(err, EngineError::MissingBoardData { .. }));
    let (level, message) = host.last_note().unwrap();
    assert_eq!(*level, NotifyLevel::Error);
    assert!(message.contains("document source"));
    assert_eq!(host.writes, 0);
}

#[tokio::test]
async fn netlist_without_components_aborts_before_reconstruction() {
    for netlist in [json!({}), json!({"components": {}})] {
        let mut host = MemoryHost::new(BOARD, scenario_pads());
        host.netlist = netlist.clone();

        let err = run(&mut host, &RunOptions::default()).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::MissingBoardData {
                what: "netlist document",
                ..
            }
        ));
        assert_eq!(host.writes, 0);
        assert_eq!(host.netlist, netlist);
        let (level, message) = host.last_note().unwrap();
        assert_eq!(*level, NotifyLevel::Error);
        assert!(message.contains("no components"));
    }
}

#[tokio::test]
async fn joining_two_named_nets_warns() {
    let pads = vec![
        HostPad::rect("c1e1", 1, Point::new(0.0, 0.0), 30.0, 30.0).with_net("GND"),
        HostPad::rect("c2e1", 1, Point::new(25.0, 0.0), 30.0, 30.0).with_net("VCC"),
    ];
    let mut host = MemoryHost::new(BOARD, pads);

    let report = run(&mut host, &RunOptions::default()).await.unwrap();

    assert_eq!(report.outcome.nets.merged_clusters, 1);
    assert_eq!(find_pin_net(&host.netlist, "R2", "1"), Some("GND"));
    assert!(host
        .notes
        .iter()
        .any(|(level, message)| *level == NotifyLevel::Warning && message.contains("different net names")));
    assert!(matches!(host.last_note(), Some((NotifyLevel::Success, _))));
}

#[tokio::test]
async fn rejected_write_is_a_write_back_error() {
    let mut host = MemoryHost::new(BOARD, scenario_pads());
    host.reject_writes = true;

    let err = run(&mut host, &RunOptions::default()).await.unwrap_err();

    assert!(matches!(err, EngineError::WriteBack { .. }));
    let (level, message) = host.last_note().unwrap();
    assert_eq!(*level, NotifyLevel::Error);
    assert!(message.contains("document is locked"));
}
