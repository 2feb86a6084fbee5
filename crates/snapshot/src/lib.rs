//! # Impact Snapshot
//!
//! Writes the final pass of a run as a timestamped text file:
//!
//! ```text
//! /work/target/classes/com/acme/Foo.class[
//! 	com.acme.FooTest,
//! ]
//! ```
//!
//! One block per change unit, units and affected names both in ascending
//! order, so two exports of the same data have identical bodies.

mod error;
mod exporter;
mod target;

pub use error::{Result, SnapshotError};
pub use exporter::{render, SnapshotExporter};
pub use target::{CollisionPolicy, SnapshotTarget};
