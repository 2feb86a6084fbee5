//! # Impact Protocol
//!
//! Vocabulary shared by the orchestrator and any analysis engine it drives.
//!
//! ```text
//! ChangeSet ──(one ChangeUnit at a time)──> AnalysisEngine::update
//!                                                │
//!                                                └─> AffectedSet (unordered)
//!
//! UnitResponse* ──> PassResponses (one per pass, last one kept)
//! ```
//!
//! The engine is a black box: callers only rely on the single-unit
//! `update` contract, never on how the engine stores its graph.

mod affected;
mod engine;
mod unit;

pub use affected::{AffectedSet, AffectedUnit};
pub use engine::{AnalysisEngine, EngineError, PassResponses, UnitResponse};
pub use unit::{ChangeSet, ChangeUnit, UNIT_SUFFIX};
