//! Foundation types for Quire.
//!
//! Quire stores hierarchical "pages" made of named, ordered content areas and
//! keeps a version log with human-readable diffs for every mutation. This
//! crate holds the shapes every other Quire crate passes around.
//!
//! # Key Types
//!
//! - [`Page`] — a document addressed by slug, holding named [`Area`]s
//! - [`Area`] — an ordered list of polymorphic [`Item`]s
//! - [`Version`] — immutable snapshot of a page plus its [`DiffSegment`]s
//! - [`Redirect`] — one-hop slug rename record
//! - [`Context`] — request-scoped caller information
//! - [`AreaSlug`] — parsed `pageSlug:areaName` composite key
//!
//! The [`sanitize`] module carries the string and form-input helpers shared
//! by item types and callers.

pub mod context;
pub mod error;
pub mod id;
pub mod page;
pub mod redirect;
pub mod sanitize;
pub mod slug;
pub mod version;

pub use context::Context;
pub use error::TypeError;
pub use id::{PageId, VersionId};
pub use page::{Area, Item, Page};
pub use redirect::Redirect;
pub use slug::{is_tree_slug, AreaSlug};
pub use version::{ChangeKind, DiffSegment, Version};
