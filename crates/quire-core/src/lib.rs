//! Quire core.
//!
//! Pages are documents addressed by slug and made of named content areas.
//! Every mutation is followed by a version snapshot carrying a readable diff
//! against the page's previous version.
//!
//! # Components
//!
//! - [`SlugResolver`] -- longest-prefix resolution over the page tree
//! - [`AreaStore`] -- area reads and targeted area writes
//! - [`PageStore`] -- whole-page writes with slug-collision retry, rollback, rename
//! - [`VersionManager`] -- snapshots and history
//! - [`ItemLoader`] -- concurrent item loading at fetch time
//! - [`RedirectTracker`] -- one-hop redirects left behind by renames
//!
//! [`Quire`] wires them over shared storage, an item type registry and the
//! permission and identity collaborators.
//!
//! # Write order
//!
//! Every write runs permission check, then storage mutation, then version
//! snapshot. There is no transaction across the last two.

pub mod areas;
pub mod config;
pub mod error;
pub mod identity;
pub mod loader;
pub mod pages;
pub mod permissions;
pub mod quire;
pub mod redirects;
pub mod resolver;
pub mod versions;

pub use areas::{AreaStore, GetAreaOptions};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use identity::{ContextUser, IdentityAccessor};
pub use loader::{ItemLoader, LOAD_TIMED_OUT_FIELD};
pub use pages::PageStore;
pub use permissions::{Action, AllowAll, PermissionChecker, PermissionTarget};
pub use quire::{Quire, QuireBuilder};
pub use redirects::RedirectTracker;
pub use resolver::{Resolution, SlugResolver};
pub use versions::{PageRef, VersionManager};
