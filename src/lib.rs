//! Preproc Harness - ordered test runner for the preprocessor stage of the Baa compiler.
//!
//! This crate provides:
//! - The static, dependency-ordered manifest of preprocessor test executables
//! - Sequential execution of each executable with a wall-clock timeout
//! - Classification of every run as passed, failed, timed out, missing or errored
//! - A text report with per-test details and next-step recommendations
//!
//! # Example
//!
//! ```rust,no_run
//! use preproc_harness::{Report, Runner, preprocessor_suite};
//!
//! let runner = Runner::new("build");
//! let run = runner.run_all(preprocessor_suite());
//! print!("{}", Report::new(&run));
//! std::process::exit(if run.success() { 0 } else { 1 });
//! ```

pub mod config;
pub mod manifest;
pub mod report;
pub mod runner;

// Re-export manifest types
pub use manifest::{TestSpec, preprocessor_suite};

// Re-export runner types
pub use runner::{HarnessError, HarnessResult, Outcome, RunProgress, Runner, SuiteRun, TestResult, TestStatus};

// Re-export reporting
pub use report::{Report, RunSummary, render_progress, render_test_header};
