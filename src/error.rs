use thiserror::Error;

//crate-wide error taxonomy
//per-trial errors inside a search are caught and recorded as soft failures;
//direct simulator/metrics invocations propagate these to the caller
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("no viable trial: all {attempted} trials failed (first cause: {first_cause})")]
    NoViableTrial { attempted: usize, first_cause: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}
