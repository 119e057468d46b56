//! The preprocessor test suite manifest.
//!
//! Entries are listed in dependency order: each test exercises behavior that
//! the tests before it have already validated, so the report reads from the
//! simplest feature to the most involved one.

use std::path::{Path, PathBuf};

/// A single test executable in the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestSpec {
    /// Human-readable name shown in the report
    pub display_name: &'static str,

    /// File name of the test executable inside the suite directory
    pub executable_id: &'static str,
}

impl TestSpec {
    pub const fn new(display_name: &'static str, executable_id: &'static str) -> Self {
        Self {
            display_name,
            executable_id,
        }
    }

    /// Path of the executable under the given suite directory
    pub fn resolve(&self, suite_root: &Path) -> PathBuf {
        suite_root.join(self.executable_id)
    }
}

const PREPROCESSOR_SUITE: &[TestSpec] = &[
    TestSpec::new("Basic Preprocessor Conditionals", "test_preprocessor"),
    TestSpec::new("Preprocessor Conditionals", "test_preprocessor_conditionals"),
    TestSpec::new("Basic Macro Functionality", "test_preprocessor_macros"),
    TestSpec::new("Predefined Macros", "test_preprocessor_predefined"),
    TestSpec::new("Error and Warning Directives", "test_preprocessor_directives"),
    TestSpec::new("Enhanced Error System", "test_enhanced_error_system"),
    TestSpec::new("Advanced Macro Features", "test_preprocessor_advanced_macros"),
    TestSpec::new("Advanced Expression Evaluation", "test_preprocessor_expressions"),
    TestSpec::new("Comprehensive File-Based Tests", "test_preprocessor_comprehensive"),
];

/// The preprocessor suite, in execution order
pub fn preprocessor_suite() -> &'static [TestSpec] {
    PREPROCESSOR_SUITE
}
