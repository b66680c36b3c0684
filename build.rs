//! Stamps the launcher build.
//!
//! The page footer and the exporter's startup log show `SRL_VERSION` and
//! `SRL_GIT_SHA`. Release pipelines set both; local builds take the crate
//! version and ask git for the short commit.

use std::env;
use std::process::Command;

const SHORT_SHA_LEN: usize = 7;

/// CI variables carrying the full commit, checked in order
const CI_SHA_VARS: &[&str] = &["GITHUB_SHA", "CI_COMMIT_SHA"];

fn main() {
    let version = env::var("SRL_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "unknown".into());

    let sha = env::var("SRL_GIT_SHA")
        .ok()
        .or_else(ci_sha)
        .or_else(git_short_sha)
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=SRL_VERSION={}", version);
    println!("cargo:rustc-env=SRL_GIT_SHA={}", sha);

    for var in ["SRL_VERSION", "SRL_GIT_SHA"].iter().chain(CI_SHA_VARS) {
        println!("cargo:rerun-if-env-changed={}", var);
    }
}

fn ci_sha() -> Option<String> {
    CI_SHA_VARS
        .iter()
        .find_map(|var| env::var(var).ok())
        .map(|sha| sha.chars().take(SHORT_SHA_LEN).collect())
}

fn git_short_sha() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8(output.stdout).ok()?;
    Some(sha.trim().to_string()).filter(|s| !s.is_empty())
}
