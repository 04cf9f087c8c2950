use thiserror::Error;

/// Error types for the findpeaks-rs library.
#[derive(Error, Debug)]
pub enum FindPeaksError {
    /// Invalid combination or value of configuration options.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A workspace index outside of the available spectra.
    #[error("Workspace index {index} is out of range (workspace has {count} spectra)")]
    IndexError { index: usize, count: usize },

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A peak or background function name that is not registered.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Integer accumulator overflow in a combinatorial computation.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// Error during function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// The fit service could not run at all.
    #[error("Fit service failure: {0}")]
    FitService(String),

    /// The smoothing service could not run at all.
    #[error("Smoothing failure: {0}")]
    Smoothing(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for findpeaks-rs operations.
pub type Result<T> = std::result::Result<T, FindPeaksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FindPeaksError::DimensionMismatch("expected 10 values, got 9".to_string());
        assert!(format!("{}", err).contains("expected 10 values, got 9"));

        let err = FindPeaksError::IndexError { index: 4, count: 2 };
        let msg = format!("{}", err);
        assert!(msg.contains('4'));
        assert!(msg.contains("2 spectra"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FindPeaksError = io_err.into();

        match err {
            FindPeaksError::IoError(_) => (),
            _ => panic!("Expected IoError variant"),
        }

        let json_err = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err();
        let err: FindPeaksError = json_err.into();
        assert!(matches!(err, FindPeaksError::JsonError(_)));
    }
}
