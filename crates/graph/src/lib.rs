//! # Impact Graph
//!
//! Reference incremental analysis engine over a unit dependency graph.
//!
//! ## Architecture
//!
//! ```text
//! ChangeUnit
//!     │
//!     ├──> DependencyExtractor (manifest, or none)
//!     │      └─ names of the units it depends on
//!     │
//!     ├──> Unit Graph (petgraph)
//!     │      ├─ Nodes: units (registered, or placeholders for names seen as dependencies)
//!     │      └─ Edges: dependent -> dependency
//!     │
//!     └──> Affected tests
//!            └─ registered test units that reach the changed unit
//! ```
//!
//! The graph starts empty. A unit that is updated before the units that
//! depend on it sees none of them, so the first pass over a change set
//! under-reports and later passes fill in.

mod builder;
mod engine;
mod error;
mod extractor;
mod graph;
mod types;

pub use builder::GraphEngineBuilder;
pub use engine::{is_test_name, GraphEngine};
pub use error::{GraphError, Result};
pub use extractor::{DependencyExtractor, ManifestExtractor, NoDependencies};
pub use types::{UnitGraph, UnitKind, UnitNode};
