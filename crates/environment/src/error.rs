use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnvironmentError>;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Classpath descriptor {path} doesn't exist or is unreadable: {source}")]
    ClasspathUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Toolchain home is not set (IMPACT_TOOLCHAIN_HOME / JAVA_HOME)")]
    ToolchainHomeUnset,

    #[error("Toolchain executable not found: {0}")]
    ToolchainNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EnvironmentError {
    /// Process exit status reserved for a missing classpath descriptor.
    pub const CLASSPATH_EXIT_CODE: i32 = 10;

    pub fn exit_code(&self) -> i32 {
        match self {
            EnvironmentError::ClasspathUnreadable { .. } => Self::CLASSPATH_EXIT_CODE,
            _ => 1,
        }
    }
}
