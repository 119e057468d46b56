//! Types for test run results.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::manifest::TestSpec;

/// Terminal classification of a single test execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Passed,
    Failed,
    Timeout,
    NotFound,
    Error,
}

impl TestStatus {
    /// Label used in the report
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Timeout => "TIMEOUT",
            TestStatus::NotFound => "NOT_FOUND",
            TestStatus::Error => "ERROR",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TestStatus::Passed => "✅",
            TestStatus::Failed => "❌",
            TestStatus::Timeout => "⏰",
            TestStatus::NotFound => "❓",
            TestStatus::Error => "💥",
        }
    }

    /// Whether this status points at the environment or tooling rather than
    /// at the code under test. Only `Failed` is attributable to the tested code.
    pub fn is_environmental(self) -> bool {
        matches!(self, TestStatus::Timeout | TestStatus::NotFound | TestStatus::Error)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// What happened when a test executable was run.
///
/// Each variant carries exactly the data that makes sense for it: a return
/// code only exists for `Failed`, a diagnostic only for the environmental
/// outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exited with code 0
    Passed { stdout: String },

    /// Exited with a non-zero code (or was killed by a signal)
    Failed {
        stdout: String,
        stderr: String,
        return_code: i32,
    },

    /// Still running when the deadline hit; the process was killed
    Timeout { message: String },

    /// The executable does not exist; nothing was spawned
    NotFound { message: String },

    /// The harness could not launch or observe the process
    Error { message: String },
}

/// Result of running one manifest entry
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// Display name copied from the manifest
    pub name: String,

    /// Wall-clock time from spawn to exit (zero when nothing was spawned)
    pub duration: Duration,

    pub outcome: Outcome,
}

impl TestResult {
    pub fn new(name: impl Into<String>, duration: Duration, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            duration,
            outcome,
        }
    }

    pub fn status(&self) -> TestStatus {
        match self.outcome {
            Outcome::Passed { .. } => TestStatus::Passed,
            Outcome::Failed { .. } => TestStatus::Failed,
            Outcome::Timeout { .. } => TestStatus::Timeout,
            Outcome::NotFound { .. } => TestStatus::NotFound,
            Outcome::Error { .. } => TestStatus::Error,
        }
    }

    pub fn passed(&self) -> bool {
        self.status() == TestStatus::Passed
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Captured standard output (`Passed` and `Failed` only)
    pub fn stdout(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Passed { stdout } | Outcome::Failed { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// Captured standard error (`Failed` only)
    pub fn stderr(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Process exit code (`Failed` only)
    pub fn return_code(&self) -> Option<i32> {
        match &self.outcome {
            Outcome::Failed { return_code, .. } => Some(*return_code),
            _ => None,
        }
    }

    /// Harness explanation for `Timeout`, `NotFound` and `Error`
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Timeout { message }
            | Outcome::NotFound { message }
            | Outcome::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Results of a complete suite run, in manifest order
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteRun {
    /// When the first test was started
    pub started_at: DateTime<Utc>,

    /// One result per manifest entry
    pub results: Vec<TestResult>,
}

impl SuiteRun {
    /// True when every test passed
    pub fn success(&self) -> bool {
        self.results.iter().all(TestResult::passed)
    }

    /// Non-passing results, in manifest order
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}

/// Progress update delivered while a suite is running
#[derive(Debug, Clone, Copy)]
pub enum RunProgress<'a> {
    /// About to run the test at `index` (0-based)
    Started {
        index: usize,
        total: usize,
        spec: &'a TestSpec,
    },
    /// The test at `index` finished and has been recorded
    Finished {
        index: usize,
        total: usize,
        result: &'a TestResult,
    },
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that stop the harness before or outside of test execution.
///
/// Individual test failures are never errors; they are recorded as an
/// [`Outcome`].
#[derive(Debug)]
pub enum HarnessError {
    /// The build directory does not exist
    BuildDirMissing(PathBuf),

    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::BuildDirMissing(path) => {
                write!(f, "Build directory not found: {}", path.display())
            }
            HarnessError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::BuildDirMissing(_) => None,
            HarnessError::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Io(err)
    }
}
