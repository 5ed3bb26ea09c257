//! Document storage for Quire.
//!
//! Three logical collections back the core:
//!
//! - pages — `slug` unique, `path` sparse-unique, `id` unique
//! - versions — indexed by `pageId` and `createdAt` descending
//! - redirects — `from` unique
//!
//! # Storage Backends
//!
//! All backends implement [`PageCollection`], [`VersionCollection`] and
//! [`RedirectCollection`]:
//!
//! - [`InMemoryStore`] -- lock-protected maps for tests, embedding and the CLI,
//!   with JSON [`Snapshot`] import/export
//!
//! # Design Rules
//!
//! 1. Single-document writes are atomic. Targeted area updates touch only the
//!    named area, so writers to different areas never clobber each other.
//! 2. Uniqueness is enforced by the store and reported as
//!    [`StoreError::UniqueViolation`]; callers decide whether to retry.
//! 3. There is no cross-collection transaction.
//! 4. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult, UniqueField};
pub use memory::InMemoryStore;
pub use snapshot::Snapshot;
pub use traits::{PageCollection, RedirectCollection, VersionCollection};
