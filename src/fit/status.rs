//! Fit status reporting.

use std::fmt;

const SUCCESS: &str = "success";
const TOLERANCE_UNREACHABLE: &str = "cannot reach the specified tolerance in F";

/// Outcome category of one call to the fit service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitStatus {
    /// The minimizer converged.
    Success,
    /// Damping saturated without lowering the cost further. Accepted as a
    /// soft failure.
    ToleranceUnreachable,
    /// The iteration cap was hit.
    MaxIterations(usize),
    /// Anything else.
    Failed(String),
}

impl FitStatus {
    /// Status text as reported to callers.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Success, or a message containing both "cannot" and "tolerance".
    pub fn is_acceptable(&self) -> bool {
        let message = self.message();
        message == SUCCESS || (message.contains("cannot") && message.contains("tolerance"))
    }

    /// Parse a status string produced by an external minimizer.
    pub fn from_message(message: &str) -> Self {
        let trimmed = message.trim();
        if trimmed == SUCCESS {
            return FitStatus::Success;
        }
        if trimmed == TOLERANCE_UNREACHABLE {
            return FitStatus::ToleranceUnreachable;
        }
        if let Some(n) = trimmed
            .strip_prefix("Failed to converge after ")
            .and_then(|rest| rest.strip_suffix(" iterations"))
            .and_then(|n| n.parse().ok())
        {
            return FitStatus::MaxIterations(n);
        }
        FitStatus::Failed(trimmed.to_string())
    }
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitStatus::Success => f.write_str(SUCCESS),
            FitStatus::ToleranceUnreachable => f.write_str(TOLERANCE_UNREACHABLE),
            FitStatus::MaxIterations(n) => write!(f, "Failed to converge after {} iterations", n),
            FitStatus::Failed(message) => f.write_str(message),
        }
    }
}
