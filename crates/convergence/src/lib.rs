//! # Impact Convergence
//!
//! Drives an [`AnalysisEngine`](impact_protocol::AnalysisEngine) over a change
//! set several times so that its responses settle.
//!
//! ```text
//! ChangeSet (sorted)
//!     │
//!     ├──> pass 1  Cold -> Warming{1}      graph filled, answers incomplete
//!     ├──> pass 2  Warming{1} -> ...       answers reflect real impact
//!     └──> pass N  -> Converged{last}      compared against pass N-1
//! ```
//!
//! Units are fed one at a time, in the same order every pass. A unit the
//! engine cannot analyse gets an empty affected set and the pass goes on.

mod driver;
mod error;
mod outcome;

pub use driver::{ConvergenceDriver, DriverState, PassCount};
pub use error::{ConvergenceError, Result};
pub use outcome::{ConvergenceOutcome, PassSummary};
