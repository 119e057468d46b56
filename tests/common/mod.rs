//! Shared fixtures: a throwaway build tree populated with shell-script test executables.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

pub const SUITE_DIR: &str = "tests/unit/preprocessor";

static EXEC_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that write and then execute scripts.
///
/// A script still open for writing in one thread while another thread forks
/// makes `exec` fail with ETXTBSY.
pub fn serial() -> MutexGuard<'static, ()> {
    EXEC_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A temporary build directory with the preprocessor suite layout
pub struct BuildTree {
    dir: TempDir,
}

impl BuildTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp build dir");
        fs::create_dir_all(dir.path().join(SUITE_DIR)).expect("Failed to create suite dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn suite_root(&self) -> PathBuf {
        self.dir.path().join(SUITE_DIR)
    }

    /// Write an executable `/bin/sh` script named `name` into the suite dir
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.suite_root().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to chmod script");
        path
    }

    /// Write a file that is not executable
    pub fn plain_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.suite_root().join(name);
        fs::write(&path, contents).expect("Failed to write file");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("Failed to chmod file");
        path
    }
}
