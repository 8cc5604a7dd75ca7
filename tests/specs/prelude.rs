// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs

pub use assert_cmd::Command;
pub use predicates::prelude::*;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Path to the mig binary, built once per test run
///
/// The binary belongs to another workspace member, so cargo does not export
/// its path to this package. Build it into the same target directory as the
/// running test executable (`<target>/<profile>/deps/specs-*`).
fn mig_bin() -> &'static Path {
    static BIN: OnceLock<PathBuf> = OnceLock::new();
    BIN.get_or_init(|| {
        let exe = std::env::current_exe().unwrap();
        let profile_dir = exe.parent().and_then(Path::parent).unwrap();
        let target_dir = profile_dir.parent().unwrap();
        let profile = profile_dir.file_name().unwrap().to_string_lossy();

        let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
        let mut build = std::process::Command::new(cargo);
        build
            .args(["build", "--quiet", "--package", "mig", "--bin", "mig"])
            .arg("--manifest-path")
            .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"))
            .arg("--target-dir")
            .arg(target_dir);
        match profile.as_ref() {
            "debug" => {}
            "release" => {
                build.arg("--release");
            }
            other => {
                build.args(["--profile", other]);
            }
        }
        let status = build.status().unwrap();
        assert!(status.success(), "failed to build the mig binary");

        profile_dir.join(format!("mig{}", std::env::consts::EXE_SUFFIX))
    })
}

/// The mig binary with credentials and log filters scrubbed from the environment
pub fn mig() -> Command {
    let mut cmd = Command::new(mig_bin());
    cmd.env_remove("ADO_PAT")
        .env_remove("GH_PAT")
        .env_remove("GH_SOURCE_PAT")
        .env_remove("RUST_LOG");
    cmd
}

/// A scratch working directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str, content: &str) -> &Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    /// mig running inside this directory
    pub fn mig(&self) -> Command {
        let mut cmd = mig();
        cmd.current_dir(self.path());
        cmd
    }
}

/// Arguments naming a pipeline target, minus the pipeline selector
pub const REWIRE_TARGET: &[&str] = &[
    "--ado-org",
    "contoso",
    "--ado-team-project",
    "payments",
    "--github-org",
    "acme",
    "--github-repo",
    "payments",
    "--service-connection-id",
    "svc-1",
];
