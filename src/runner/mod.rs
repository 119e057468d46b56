pub mod exec;
mod process;
pub mod types;

pub use exec::Runner;
pub use types::{HarnessError, HarnessResult, Outcome, RunProgress, SuiteRun, TestResult, TestStatus};
