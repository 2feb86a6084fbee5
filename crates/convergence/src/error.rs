use impact_protocol::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvergenceError>;

#[derive(Error, Debug)]
pub enum ConvergenceError {
    #[error("Pass count must be at least 1, got {0}")]
    InvalidPassCount(usize),

    #[error("Engine {engine} failed during pass {pass}")]
    Engine {
        engine: String,
        pass: usize,
        #[source]
        source: EngineError,
    },
}
