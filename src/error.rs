use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a sample or running a uniformity test.
///
/// None of these are retried; the failing invocation aborts and the message
/// is surfaced as-is to the caller.
#[derive(Debug, Error)]
pub enum UniformityError {
    /// A non-empty `#`-separated fragment is not a finite number.
    #[error("invalid number {fragment:?} at position {position}")]
    Format { fragment: String, position: usize },

    #[error("sample contains no numbers")]
    EmptySample,

    /// The sample is too small (or too degenerate) for the selected formula.
    #[error("{test} cannot run: {reason}")]
    InsufficientSample { test: &'static str, reason: String },

    #[error("failed to read sample file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("significance level must lie strictly between 0 and 1, got {0}")]
    InvalidSignificance(f64),

    /// A reference distribution rejected its parameters.
    #[error("distribution error: {0}")]
    Distribution(String),

    #[error("unknown test {0:?} (expected one of: means, variance, ks, chi2, poker)")]
    UnknownTest(String),
}

pub type Result<T> = std::result::Result<T, UniformityError>;

/// Reject significance levels outside the open interval (0, 1).
pub fn check_significance(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(UniformityError::InvalidSignificance(alpha))
    }
}
