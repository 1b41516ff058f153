use thiserror::Error;

/// Error type for configuration-level failures.
///
/// These are the only fatal errors in the model: everything that can go
/// wrong per pixel (division by zero, invalid physical domains, cloud-masked
/// inputs) yields the NaN sentinel at that cell and evaluation continues.
/// See the [`crate::sentinel`] module.
#[derive(Error, Debug)]
pub enum EtLookError {
    #[error("unsupported {model} version `{version}` (expected one of {expected})")]
    UnsupportedVersion {
        model: &'static str,
        version: String,
        expected: &'static str,
    },
    #[error("invalid export selection `{0}` (expected \"default\", \"all\" or a list of variable names)")]
    InvalidExportSelection(String),
    #[error("required input `{variable}` is missing from the container ({pipeline})")]
    MissingRequiredInput {
        variable: String,
        pipeline: &'static str,
    },
    #[error("export list names `{0}`, which is neither an input nor a computed field")]
    UnknownExportVariable(String),
    #[error("field `{name}` has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("step `{step}` reads `{variable}` before any step provides it")]
    StepOrdering { step: String, variable: String },
    #[error("failed to parse parameters: {0}")]
    Parameters(String),
}

/// Convenience type for `Result<T, EtLookError>`.
pub type EtLookResult<T> = Result<T, EtLookError>;
