//! Configuration management with environment variable support.
//!
//! The harness has very few knobs; everything defaults to the layout the
//! CMake build produces. Environment variables override the defaults:
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PREPROC_TESTS_BUILD_DIR` | Build directory holding the test executables | `build` |
//! | `PREPROC_TESTS_SUITE_DIR` | Suite directory, relative to the build directory | `tests/unit/preprocessor` |
//! | `PREPROC_TESTS_TIMEOUT` | Per-test wall-clock timeout in seconds (at most one day) | `30` |
//! | `PREPROC_TESTS_POLL_MS` | How often a running test is polled for exit (ms) | `50` |
//!
//! # Example
//!
//! ```bash
//! # Run against an out-of-tree build with a tighter budget
//! export PREPROC_TESTS_BUILD_DIR="/tmp/baa-build"
//! export PREPROC_TESTS_TIMEOUT=10
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

/// Default build directory
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Default location of the preprocessor test executables inside the build directory
pub const DEFAULT_SUITE_DIR: &str = "tests/unit/preprocessor";

/// Default per-test timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest accepted per-test timeout (seconds); larger values are clamped
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Default interval between exit polls of a running test (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the build directory
pub const ENV_BUILD_DIR: &str = "PREPROC_TESTS_BUILD_DIR";

/// Environment variable for the suite directory
pub const ENV_SUITE_DIR: &str = "PREPROC_TESTS_SUITE_DIR";

/// Environment variable for the per-test timeout
pub const ENV_TIMEOUT: &str = "PREPROC_TESTS_TIMEOUT";

/// Environment variable for the poll interval
pub const ENV_POLL_INTERVAL: &str = "PREPROC_TESTS_POLL_MS";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized harness configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Build directory holding the compiled test executables
    pub build_dir: PathBuf,
    /// Suite directory, relative to `build_dir`
    pub suite_dir: PathBuf,
    /// Wall-clock budget for a single test executable
    pub timeout: Duration,
    /// Exit poll granularity while a test is running
    pub poll_interval: Duration,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            build_dir: lookup(ENV_BUILD_DIR)
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR)),
            suite_dir: lookup(ENV_SUITE_DIR)
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUITE_DIR)),
            timeout: Duration::from_secs(
                parse_positive(lookup(ENV_TIMEOUT))
                    .map(|secs| secs.min(MAX_TIMEOUT_SECS))
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            poll_interval: Duration::from_millis(
                parse_positive(lookup(ENV_POLL_INTERVAL)).unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse a strictly positive integer; zero and garbage fall back to the default.
fn parse_positive(value: Option<String>) -> Option<u64> {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}
