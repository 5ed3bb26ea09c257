//! Diff engine for Quire.
//!
//! Pages are schemaless, so they are not diffed structurally. Instead each
//! page is flattened into a canonical sequence of text lines (metadata,
//! listener lines, then area contents in area-name order) and two sequences
//! are line-diffed. Only added and removed runs are kept.
//!
//! # Key Types
//!
//! - [`DiffEngine`] -- canonical page lines plus registered diff listeners
//! - [`diff_lines`] -- line-level diff producing [`DiffSegment`](quire_types::DiffSegment)s

pub mod engine;
pub mod line_diff;

pub use engine::{DiffEngine, DiffListener};
pub use line_diff::diff_lines;
