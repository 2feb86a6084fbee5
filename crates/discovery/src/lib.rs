//! # Impact Discovery
//!
//! Enumerates compiled units under a set of output directories.
//!
//! ```text
//! [target/classes, target/test-classes, ...]
//!     │
//!     └──> recursive walk (files matching `.*\.class`)
//!            └─> ChangeSet (walk order, duplicates dropped)
//! ```
//!
//! A directory that does not exist contributes nothing: output directories
//! are routinely absent before the first build of their sources.
//! Symbolic links are never descended into; a link that resolves to a regular
//! file is a unit named after the link.
//!
//! ## Example
//!
//! ```no_run
//! use impact_discovery::ChangeSetDiscovery;
//!
//! let discovery = ChangeSetDiscovery::new();
//! let change_set = discovery.discover(&["target/classes", "target/test-classes"]);
//! println!("{} compiled units", change_set.len());
//! ```

mod error;
mod scanner;
mod stats;

pub use error::{DiscoveryError, Result};
pub use scanner::{ChangeSetDiscovery, DiscoveryReport, DEFAULT_UNIT_PATTERN};
pub use stats::DiscoveryStats;
