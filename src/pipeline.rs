//! One reconstruction run, end to end.
//!
//! ```text
//! host.netlist_document ─┐
//! host.document_source ──┼─► process ─► host.set_netlist_document (if changed)
//! host.all_pads ─────────┘                  └─► host.notify
//! ```
//!
//! All reads happen before any computation, and the single write happens
//! only after everything succeeded. Failures are reported through
//! [`BoardHost::notify`] before being returned.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

use crate::board::{parse_board, HostPad, ParseStats, SourceFormat};
use crate::config::EngineConfig;
use crate::engine::{reconstruct, NetReport};
use crate::error::{EngineError, EngineResult};
use crate::host::{BoardHost, NotifyLevel};
use crate::netlist::{apply_assignments, components, DocumentLayout, PatchOutcome};

/// Settings for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunOptions {
    /// Document format of the host.
    pub format: SourceFormat,
    /// Engine settings.
    pub engine: EngineConfig,
    /// Compute everything but skip the write-back.
    pub dry_run: bool,
}

/// Result of [`process`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessOutcome {
    /// Reader counters.
    pub parse: ParseStats,
    /// Primitives considered, pads included.
    pub primitives: usize,
    /// Pads merged from the host list.
    pub pads: usize,
    /// Engine output.
    pub nets: NetReport,
    /// Netlist changes.
    pub patch: PatchOutcome,
}

/// Result of [`run`].
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Computation results.
    pub outcome: ProcessOutcome,
    /// Whether the netlist was written back.
    pub written: bool,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of pin nets changed.
    #[must_use]
    pub const fn change_count(&self) -> usize {
        self.outcome.patch.change_count
    }
}

/// Reconstructs nets and patches `netlist` in place, without any I/O.
///
/// # Errors
///
/// Returns [`EngineError::MissingBoardData`] if the source is blank, or the
/// netlist is not a JSON object or has no components.
pub fn process(
    source: &str,
    netlist: &mut Value,
    pads: &[HostPad],
    options: &RunOptions,
) -> EngineResult<ProcessOutcome> {
    if source.trim().is_empty() {
        return Err(EngineError::missing("document source", "source is empty"));
    }
    let Some(layout) = DocumentLayout::detect(netlist) else {
        return Err(EngineError::missing(
            "netlist document",
            "document is not a JSON object",
        ));
    };
    if !components(netlist).is_some_and(|table| !table.is_empty()) {
        return Err(EngineError::missing("netlist document", "no components"));
    }

    let mut board = parse_board(source, &options.engine.parse_options(options.format));
    let pad_count = board.add_host_pads(pads, &options.engine.pad_options());
    let nets = reconstruct(&board, &options.engine);
    let patch = apply_assignments(netlist, &nets.assignments);

    tracing::info!(
        format = ?options.format,
        layout = ?layout,
        primitives = board.primitives.len(),
        pads = pad_count,
        clusters = nets.clusters,
        assignments = nets.assignments.len(),
        changes = patch.change_count,
        "Reconstructed physical nets"
    );

    Ok(ProcessOutcome {
        parse: board.stats,
        primitives: board.primitives.len(),
        pads: pad_count,
        nets,
        patch,
    })
}

/// Runs a full reconstruction against a host.
///
/// # Errors
///
/// Returns an [`EngineError`] if a host read fails, required data is
/// missing, or the write-back fails. The host has already been notified.
pub async fn run<H: BoardHost>(host: &mut H, options: &RunOptions) -> EngineResult<RunReport> {
    let started = Instant::now();
    match execute(host, options).await {
        Ok((outcome, written)) => {
            let report = RunReport {
                outcome,
                written,
                elapsed: started.elapsed(),
            };
            let seconds = report.elapsed.as_secs_f64();
            let (level, message) = if report.change_count() == 0 {
                (
                    NotifyLevel::Info,
                    format!("Analysis finished in {seconds:.2}s, no pin nets changed"),
                )
            } else if written {
                (
                    NotifyLevel::Success,
                    format!(
                        "Analysis finished in {seconds:.2}s, updated {} pin nets",
                        report.change_count()
                    ),
                )
            } else {
                (
                    NotifyLevel::Info,
                    format!(
                        "Dry run finished in {seconds:.2}s, {} pin nets would change",
                        report.change_count()
                    ),
                )
            };
            let merged = report.outcome.nets.merged_clusters;
            if merged > 0 {
                host.notify(
                    NotifyLevel::Warning,
                    &format!("{merged} connected groups joined copper with different net names"),
                )
                .await;
            }
            host.notify(level, &message).await;
            Ok(report)
        }
        Err(e) => {
            host.notify(NotifyLevel::Error, &error_chain(&e)).await;
            Err(e)
        }
    }
}

async fn execute<H: BoardHost>(
    host: &mut H,
    options: &RunOptions,
) -> EngineResult<(ProcessOutcome, bool)> {
    let mut netlist = host
        .netlist_document()
        .await
        .map_err(|source| EngineError::Host {
            operation: "netlist_document",
            source,
        })?;
    let source = host
        .document_source()
        .await
        .map_err(|source| EngineError::Host {
            operation: "document_source",
            source,
        })?;
    let pads = host.all_pads().await.map_err(|source| EngineError::Host {
        operation: "all_pads",
        source,
    })?;

    let outcome = process(&source, &mut netlist, &pads, options)?;

    if outcome.patch.change_count == 0 || options.dry_run {
        return Ok((outcome, false));
    }
    host.set_netlist_document(&netlist)
        .await
        .map_err(|source| EngineError::WriteBack { source })?;
    Ok((outcome, true))
}

/// Formats an error with its sources, outermost first.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
