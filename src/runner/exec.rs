use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config;
use crate::manifest::TestSpec;
use crate::runner::process::{self, ProcessExit};
use crate::runner::types::{Outcome, RunProgress, SuiteRun, TestResult};

/// Runs manifest entries one at a time against a build directory
#[derive(Debug, Clone)]
pub struct Runner {
    /// Build directory produced by CMake
    pub build_dir: PathBuf,

    /// Location of the test executables, relative to `build_dir`
    pub suite_dir: PathBuf,

    /// Wall-clock budget for each test executable
    pub timeout: Duration,

    /// How often a running test is polled for exit
    pub poll_interval: Duration,
}

impl Runner {
    /// Create a runner for `build_dir`, taking everything else from the
    /// global configuration.
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        let cfg = config::get();
        Self {
            build_dir: build_dir.into(),
            suite_dir: cfg.suite_dir.clone(),
            timeout: cfg.timeout,
            poll_interval: cfg.poll_interval,
        }
    }

    pub fn suite_dir(mut self, suite_dir: impl Into<PathBuf>) -> Self {
        self.suite_dir = suite_dir.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Directory the executables are resolved against
    pub fn suite_root(&self) -> PathBuf {
        self.build_dir.join(&self.suite_dir)
    }

    /// Run a single test executable and classify how it ended.
    ///
    /// A missing executable is reported as `NotFound` without spawning
    /// anything. This never retries and never returns an error: every
    /// failure mode is a classified result.
    pub fn execute_one(&self, spec: &TestSpec) -> TestResult {
        let path = spec.resolve(&self.suite_root());

        if !is_existing_file(&path) {
            debug!(path = %path.display(), "test executable missing");
            return TestResult::new(
                spec.display_name,
                Duration::ZERO,
                Outcome::NotFound {
                    message: format!("Executable not found: {}", path.display()),
                },
            );
        }

        let start = Instant::now();
        let exit = process::run_with_deadline(&path, self.timeout, self.poll_interval);
        let duration = start.elapsed();

        let outcome = match exit {
            Ok(ProcessExit::Exited {
                status,
                stdout,
                stderr,
            }) => {
                let stdout = String::from_utf8_lossy(&stdout).into_owned();
                if status.success() {
                    Outcome::Passed { stdout }
                } else {
                    Outcome::Failed {
                        stdout,
                        stderr: String::from_utf8_lossy(&stderr).into_owned(),
                        return_code: process::exit_code(&status),
                    }
                }
            }
            Ok(ProcessExit::TimedOut) => Outcome::Timeout {
                message: timeout_message(self.timeout),
            },
            Err(err) => Outcome::Error {
                message: err.to_string(),
            },
        };

        TestResult::new(spec.display_name, duration, outcome)
    }

    /// Run every entry of `manifest` in order
    pub fn run_all(&self, manifest: &[TestSpec]) -> SuiteRun {
        self.run_all_with_progress(manifest, |_| {})
    }

    /// Run every entry of `manifest` in order, reporting progress as each
    /// test starts and finishes.
    ///
    /// Tests run strictly one after another; the next one is not started
    /// until the previous process has exited or been killed.
    pub fn run_all_with_progress<F>(&self, manifest: &[TestSpec], mut on_progress: F) -> SuiteRun
    where
        F: FnMut(RunProgress<'_>),
    {
        let total = manifest.len();
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(total);

        info!(total, suite_root = %self.suite_root().display(), "starting test suite");

        for (index, spec) in manifest.iter().enumerate() {
            on_progress(RunProgress::Started { index, total, spec });

            let result = self.execute_one(spec);
            debug!(
                name = %result.name,
                status = %result.status(),
                duration_ms = result.duration.as_millis() as u64,
                "test finished"
            );
            results.push(result);

            on_progress(RunProgress::Finished {
                index,
                total,
                result: &results[index],
            });
        }

        SuiteRun {
            started_at,
            results,
        }
    }
}

fn timeout_message(timeout: Duration) -> String {
    let secs = timeout.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("Test timed out after {} seconds", timeout.as_secs())
    } else {
        format!("Test timed out after {:.2} seconds", secs)
    }
}

fn is_existing_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
