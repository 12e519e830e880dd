//! physical-nets: reconstruct netlist pin assignments from board copper
//!
//! Given a board document (tracks, arcs, vias, filled copper areas) and the
//! board's pads, this library works out which pads are electrically joined by
//! copper and writes the resulting nets back into the netlist document.
//!
//! # Architecture
//!
//! ```text
//! document source ─► board::parse_board ─┐
//! host pads ───────► BoardData::add_host_pads
//!                                        ▼
//!                     engine::reconstruct (grid ─► touch tests ─► union-find ─► naming)
//!                                        ▼
//! netlist document ◄─ netlist::apply_assignments
//! ```
//!
//! The whole computation is synchronous and free of I/O ([`pipeline::process`]).
//! Host interaction goes through the async [`host::BoardHost`] trait.
//!
//! # Modules
//!
//! - [`board`]: Record parsing, layer stack, pad/pin bindings
//! - [`config`]: Configuration loading and validation
//! - [`engine`]: Spatial index, connectivity clustering, net naming
//! - [`error`]: Error types
//! - [`geometry`]: Copper shapes and touch tests
//! - [`host`]: Host boundary and the file-backed host
//! - [`netlist`]: Netlist document access and patching
//! - [`pipeline`]: One end-to-end run

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod netlist;
pub mod pipeline;
