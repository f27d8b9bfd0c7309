//! Structured exit codes.

use crate::engine::RunResult;

/// Exit codes for the MediaDupe application.
///
/// - 0: Success (completed normally, duplicates handled)
/// - 1: General error (unexpected failure)
/// - 2: Nothing to do (completed normally, no duplicates)
/// - 3: Partial success (completed with some non-fatal errors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: the run completed and duplicates were found or removed.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Nothing to do: the run completed but found no duplicates.
    NoDuplicates = 2,
    /// Partial success: the run completed but some files were skipped or
    /// could not be deleted.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "MD000",
            Self::GeneralError => "MD001",
            Self::NoDuplicates => "MD002",
            Self::PartialSuccess => "MD003",
        }
    }

    /// Derive the exit code for a completed deletion run.
    #[must_use]
    pub fn from_run_result(result: &RunResult) -> Self {
        if result.errors > 0 {
            Self::PartialSuccess
        } else if result.deleted == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::NoDuplicates.as_i32(), 2);
        assert_eq!(ExitCode::PartialSuccess.as_i32(), 3);
    }

    #[test]
    fn test_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "MD000");
        assert_eq!(ExitCode::PartialSuccess.code_prefix(), "MD003");
    }

    #[test]
    fn test_from_run_result() {
        let clean = RunResult {
            deleted: 3,
            errors: 0,
            bytes_freed: 10,
        };
        assert_eq!(ExitCode::from_run_result(&clean), ExitCode::Success);

        let nothing = RunResult::default();
        assert_eq!(ExitCode::from_run_result(&nothing), ExitCode::NoDuplicates);

        let partial = RunResult {
            deleted: 3,
            errors: 1,
            bytes_freed: 10,
        };
        assert_eq!(
            ExitCode::from_run_result(&partial),
            ExitCode::PartialSuccess
        );
    }
}
