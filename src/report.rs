//! Summary statistics and the human-readable report.
//!
//! Everything here is a pure function of the result sequence: counts are
//! recomputed from the results every time, never tracked separately.

use std::fmt;
use std::time::Duration;

use crate::manifest::TestSpec;
use crate::runner::{SuiteRun, TestResult, TestStatus};

const WIDE_RULE: usize = 80;
const PROGRESS_RULE: usize = 60;
const DETAIL_RULE: usize = 40;

/// Aggregate counts over a result sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    /// Every non-passing result, whatever its status
    pub failed: usize,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            total_duration: results.iter().map(|r| r.duration).sum(),
        }
    }

    /// Percentage of passing tests, or `None` when nothing ran
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.passed as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration.as_secs_f64()
    }

    /// Number of results with the given status
    pub fn count(results: &[TestResult], status: TestStatus) -> usize {
        results.iter().filter(|r| r.status() == status).count()
    }
}

/// Banner printed before a test starts
pub fn render_test_header(spec: &TestSpec) -> String {
    let rule = "=".repeat(PROGRESS_RULE);
    format!("\n{rule}\nRunning: {}\n{rule}\n", spec.display_name)
}

/// Incremental progress output for a finished test
pub fn render_progress(result: &TestResult) -> String {
    let status = result.status();
    let mut out = format!(
        "{} {} {} ({:.2}s)\n",
        status.icon(),
        result.name,
        status,
        result.duration_seconds()
    );

    if let Some(code) = result.return_code() {
        out.push_str(&format!("Return code: {}\n", code));
    }
    if let Some(stdout) = result.stdout().filter(|s| !s.is_empty() && !result.passed()) {
        out.push_str("STDOUT:\n");
        push_block(&mut out, stdout);
    }
    if let Some(stderr) = result.stderr().filter(|s| !s.is_empty()) {
        out.push_str("STDERR:\n");
        push_block(&mut out, stderr);
    }
    if let Some(message) = result.diagnostic() {
        out.push_str(message);
        out.push('\n');
    }
    out
}

fn push_block(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

/// The final report: summary, per-test lines, failure details and recommendations
pub struct Report<'a> {
    run: &'a SuiteRun,
}

impl<'a> Report<'a> {
    pub fn new(run: &'a SuiteRun) -> Self {
        Self { run }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.run.results)
    }

    fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
        let rule = "=".repeat(WIDE_RULE);
        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{title}")?;
        writeln!(f, "{rule}")
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>, summary: &RunSummary) -> fmt::Result {
        Self::section(f, "PREPROCESSOR TEST SUITE SUMMARY")?;
        writeln!(
            f,
            "Started: {}",
            self.run.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "Total Tests: {}", summary.total)?;
        writeln!(f, "Passed: {} ✅", summary.passed)?;
        writeln!(f, "Failed: {} ❌", summary.failed)?;

        let environmental: Vec<String> = [TestStatus::Timeout, TestStatus::NotFound, TestStatus::Error]
            .into_iter()
            .filter_map(|status| {
                let n = RunSummary::count(&self.run.results, status);
                (n > 0).then(|| format!("{} {}", n, status))
            })
            .collect();
        if !environmental.is_empty() {
            writeln!(f, "  of which environment/tooling: {}", environmental.join(", "))?;
        }

        match summary.success_rate() {
            Some(rate) => writeln!(f, "Success Rate: {:.1}%", rate)?,
            None => writeln!(f, "Success Rate: n/a (no tests run)")?,
        }
        writeln!(f, "Total Duration: {:.2}s", summary.total_duration_seconds())
    }

    fn write_detailed(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::section(f, "DETAILED RESULTS")?;
        for result in &self.run.results {
            let status = result.status();
            writeln!(
                f,
                "{} {:<40} {:<10} ({:.2}s)",
                status.icon(),
                result.name,
                status,
                result.duration_seconds()
            )?;
        }
        Ok(())
    }

    fn write_failures(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.run.success() {
            return Ok(());
        }

        Self::section(f, "FAILED TEST DETAILS")?;
        for result in self.run.failures() {
            let status = result.status();
            writeln!(f)?;
            writeln!(f, "{} {}", status.icon(), result.name)?;
            if status.is_environmental() {
                writeln!(f, "Status: {} (environment/tooling, not a test failure)", status)?;
            } else {
                writeln!(f, "Status: {}", status)?;
            }
            writeln!(f, "Duration: {:.2}s", result.duration_seconds())?;
            if let Some(code) = result.return_code() {
                writeln!(f, "Return Code: {}", code)?;
            }
            if let Some(stdout) = result.stdout().filter(|s| !s.is_empty()) {
                writeln!(f, "Output:")?;
                write_block(f, stdout)?;
            }
            if let Some(stderr) = result.stderr().filter(|s| !s.is_empty()) {
                writeln!(f, "Error:")?;
                write_block(f, stderr)?;
            }
            if let Some(message) = result.diagnostic() {
                writeln!(f, "Diagnostic:")?;
                write_block(f, message)?;
            }
            writeln!(f, "{}", "-".repeat(DETAIL_RULE))?;
        }
        Ok(())
    }

    fn write_recommendations(&self, f: &mut fmt::Formatter<'_>, summary: &RunSummary) -> fmt::Result {
        Self::section(f, "RECOMMENDATIONS")?;
        if self.run.success() {
            writeln!(f, "🎉 All preprocessor tests passed! The preprocessor is ready for production.")?;
            writeln!(f, "✅ You can proceed to the next compiler component (Lexer).")
        } else {
            writeln!(
                f,
                "⚠️  {} test(s) failed. Address these issues before proceeding:",
                summary.failed
            )?;
            writeln!(f, "1. Review failed test output above")?;
            writeln!(f, "2. Fix any implementation issues")?;
            writeln!(f, "3. Re-run tests to verify fixes")?;
            writeln!(f, "4. Only proceed to next component when all tests pass")
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if text.ends_with('\n') {
        write!(f, "{}", text)
    } else {
        writeln!(f, "{}", text)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        self.write_summary(f, &summary)?;
        self.write_detailed(f)?;
        self.write_failures(f)?;
        self.write_recommendations(f, &summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Outcome;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn passed(name: &str, millis: u64) -> TestResult {
        TestResult::new(
            name,
            Duration::from_millis(millis),
            Outcome::Passed {
                stdout: "ok\n".to_string(),
            },
        )
    }

    fn run_of(results: Vec<TestResult>) -> SuiteRun {
        SuiteRun {
            started_at: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
            results,
        }
    }

    #[test]
    fn test_summary_counts_and_rate() {
        let results = vec![
            passed("A", 250),
            passed("B", 500),
            TestResult::new(
                "C",
                Duration::ZERO,
                Outcome::NotFound {
                    message: "Executable not found: build/c".to_string(),
                },
            ),
        ];
        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.success_rate(), Some(2.0 / 3.0 * 100.0));
        assert!((summary.total_duration_seconds() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_success_rate_guarded_for_empty_run() {
        let summary = RunSummary::from_results(&[]);
        assert_eq!(summary.success_rate(), None);
        assert_eq!(summary.total_duration, Duration::ZERO);

        let text = Report::new(&run_of(Vec::new())).to_string();
        assert!(text.contains("Success Rate: n/a (no tests run)"));
    }

    #[test]
    fn test_report_all_passed() {
        let run = run_of(vec![passed("Basic Preprocessor Conditionals", 120)]);
        let text = Report::new(&run).to_string();
        let rule = "=".repeat(80);

        let expected = format!(
            "\n{rule}\nPREPROCESSOR TEST SUITE SUMMARY\n{rule}\n\
             Started: 2026-10-19 12:00:00 UTC\n\
             Total Tests: 1\n\
             Passed: 1 ✅\n\
             Failed: 0 ❌\n\
             Success Rate: 100.0%\n\
             Total Duration: 0.12s\n\
             \n{rule}\nDETAILED RESULTS\n{rule}\n\
             ✅ {:<40} PASSED     (0.12s)\n\
             \n{rule}\nRECOMMENDATIONS\n{rule}\n\
             🎉 All preprocessor tests passed! The preprocessor is ready for production.\n\
             ✅ You can proceed to the next compiler component (Lexer).\n",
            "Basic Preprocessor Conditionals"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_report_failure_details() {
        let run = run_of(vec![
            passed("A", 10),
            TestResult::new(
                "B",
                Duration::from_millis(40),
                Outcome::Failed {
                    stdout: "checking #if\n".to_string(),
                    stderr: "assertion failed".to_string(),
                    return_code: 2,
                },
            ),
            TestResult::new(
                "C",
                Duration::from_secs(30),
                Outcome::Timeout {
                    message: "Test timed out after 30 seconds".to_string(),
                },
            ),
        ]);
        let text = Report::new(&run).to_string();

        assert!(text.contains("  of which environment/tooling: 1 TIMEOUT\n"));
        assert!(text.contains("Success Rate: 33.3%\n"));
        assert!(text.contains("FAILED TEST DETAILS"));
        assert!(text.contains(
            "\n❌ B\nStatus: FAILED\nDuration: 0.04s\nReturn Code: 2\n\
             Output:\nchecking #if\nError:\nassertion failed\n----------------------------------------\n"
        ));
        assert!(text.contains(
            "\n⏰ C\nStatus: TIMEOUT (environment/tooling, not a test failure)\nDuration: 30.00s\n\
             Diagnostic:\nTest timed out after 30 seconds\n"
        ));
        assert!(!text.contains("\n✅ A\nStatus"));
        assert!(text.contains("⚠️  2 test(s) failed. Address these issues before proceeding:\n"));

        // Sections appear in a fixed order.
        let summary = text.find("SUITE SUMMARY").unwrap();
        let detailed = text.find("DETAILED RESULTS").unwrap();
        let failures = text.find("FAILED TEST DETAILS").unwrap();
        let recommendations = text.find("RECOMMENDATIONS").unwrap();
        assert!(summary < detailed && detailed < failures && failures < recommendations);
    }

    #[test]
    fn test_detailed_results_keep_order() {
        let run = run_of(vec![passed("Zeta", 1), passed("Alpha", 1), passed("Mid", 1)]);
        let text = Report::new(&run).to_string();
        let zeta = text.find("✅ Zeta").unwrap();
        let alpha = text.find("✅ Alpha").unwrap();
        let mid = text.find("✅ Mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_progress_lines() {
        assert_eq!(render_progress(&passed("A", 1500)), "✅ A PASSED (1.50s)\n");

        let failed = TestResult::new(
            "B",
            Duration::from_millis(20),
            Outcome::Failed {
                stdout: String::new(),
                stderr: "boom\n".to_string(),
                return_code: -9,
            },
        );
        assert_eq!(
            render_progress(&failed),
            "❌ B FAILED (0.02s)\nReturn code: -9\nSTDERR:\nboom\n"
        );

        let missing = TestResult::new(
            "C",
            Duration::ZERO,
            Outcome::NotFound {
                message: "Executable not found: build/c".to_string(),
            },
        );
        assert_eq!(
            render_progress(&missing),
            "❓ C NOT_FOUND (0.00s)\nExecutable not found: build/c\n"
        );
    }

    #[test]
    fn test_header_names_the_test() {
        let header = render_test_header(&TestSpec::new("Predefined Macros", "test_preprocessor_predefined"));
        assert!(header.contains("\nRunning: Predefined Macros\n"));
        assert!(header.starts_with(&format!("\n{}", "=".repeat(60))));
    }
}
