//! Shared testing utilities for lxdask CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Testing harness providing an isolated `$HOME` and `$DASK_CONFIG`.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        fs::create_dir_all(root.path().join("home")).expect("Failed to create test home");
        Self { root }
    }

    /// Absolute path to the emulated `$HOME` directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Directory `$DASK_CONFIG` points at. Created lazily by the CLI.
    pub fn dask_config(&self) -> PathBuf {
        self.root.path().join("dask")
    }

    /// Path of the user jobqueue file the CLI writes.
    pub fn user_config_file(&self) -> PathBuf {
        self.dask_config().join("jobqueue-cern.yaml")
    }

    /// Drop a YAML file into the user config directory.
    pub fn write_config(&self, name: &str, content: &str) {
        fs::create_dir_all(self.dask_config()).expect("Failed to create config directory");
        fs::write(self.dask_config().join(name), content).expect("Failed to write config file");
    }

    /// Build a command for invoking the compiled `lxdask` binary with a clean environment.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("lxdask").expect("Failed to locate lxdask binary");
        cmd.env_clear()
            .current_dir(self.root.path())
            .env("HOME", self.home())
            .env("DASK_CONFIG", self.dask_config());
        cmd
    }

    /// Install an executable `condor_submit` stand-in and return its directory.
    ///
    /// The script appends its arguments to `condor.log` in the same directory.
    #[cfg(unix)]
    pub fn fake_condor_submit(&self, output: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.root.path().join("bin");
        fs::create_dir_all(&bin).expect("Failed to create fake bin directory");
        let script = bin.join("condor_submit");
        let log = bin.join("condor.log");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$@\" >> '{}'\nprintf '%s\\n' '{}'\n",
                log.display(),
                output
            ),
        )
        .expect("Failed to write fake condor_submit");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark fake condor_submit executable");
        bin
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read file")
    }
}
