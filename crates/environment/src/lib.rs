//! # Impact Environment
//!
//! Resolves everything the analysis run needs from disk before any engine is
//! built.
//!
//! ```text
//! root/
//!   ├─ classpath.cp        required, read verbatim (fatal if missing)
//!   ├─ infinitest.args     optional extra worker arguments
//!   └─ **/classes, **/test-classes   output directories (explicit or scanned)
//!
//! toolchain home ──> bin/java | bin/java.exe   (validated)
//! ```

mod classpath;
mod custom_args;
mod environment;
mod error;
mod resolver;

pub use classpath::{classpath_entries, RuntimeMarker, PATH_SEPARATOR};
pub use custom_args::{parse_custom_arguments, read_custom_arguments, CUSTOM_ARGS_FILE};
pub use environment::{Environment, DEFAULT_HEAP_SIZE_MB};
pub use error::{EnvironmentError, Result};
pub use resolver::{
    read_classpath_descriptor, EnvironmentResolver, OutputDirStrategy, CLASSPATH_DESCRIPTOR,
};
