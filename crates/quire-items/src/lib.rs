//! Content item types for Quire.
//!
//! Every [`Item`](quire_types::Item) carries a `type` tag. The tag selects an
//! [`ItemType`] from the [`ItemTypeRegistry`], which supplies the item's
//! capabilities: sanitizing input, loading external data at fetch time,
//! contributing diff lines, and rendering. Unknown tags are no-ops for every
//! capability, never errors.
//!
//! The registry is filled once at startup and shared read-only afterwards.

pub mod builtin;
pub mod error;
pub mod registry;
pub mod text;

pub use error::ItemError;
pub use registry::{ItemType, ItemTypeRegistry};
pub use text::{add_diff_lines_for_markup, add_diff_lines_for_text, WRAP_WIDTH};
