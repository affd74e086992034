#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use tempfile::TempDir;

/// An isolated config, database and session for one test
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    /// Config pinned to UTC so day and month buckets do not depend on the host zone
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("config.toml"), "timezone = \"+00:00\"\nupcoming_days = 7\n").expect("write config");
        Self { dir }
    }

    pub fn daybook(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("daybook");
        cmd.env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--db")
            .arg(self.dir.path().join("daybook.db"));
        cmd
    }

    pub fn signed_in(user: &str) -> Self {
        let sandbox = Self::new();
        sandbox.daybook().args(["login", user]).assert().success();
        sandbox
    }

    /// Run a command that must succeed and return its stdout
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.daybook().args(args).assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("utf8 stdout")
    }
}
