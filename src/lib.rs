//! smurf core library.
//!
//! This crate exposes programmatic APIs for aggregating heterogeneous CI
//! check results into one unified report, filtering findings down to the
//! lines a patch touched, and rendering the outcome.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution, plus
//!   repository deep-link template derivation.
//! - `models`: Problem/Check/Report data model and the checks manifest.
//! - `normalize`: Checkstyle parsing and the raw-output converters.
//! - `patchset`: Changed-line index and the problem matching algorithm.
//! - `diffchanges`: Unified-diff scanning into per-file line intervals.
//! - `aggregate`: Merge, filter, totals, summary and URL decoration passes.
//! - `render`: XML/HTML/text serializations of a finished report.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod diffchanges;
pub mod models;
pub mod normalize;
pub mod patchset;
pub mod render;
