// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=FACEMASK_VERSION");

    // Kiosk images pin the version explicitly; dev builds describe the checkout
    let version = std::env::var("FACEMASK_VERSION").unwrap_or_else(|_| describe_checkout());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

fn describe_checkout() -> String {
    let pkg_version = env!("CARGO_PKG_VERSION");

    let hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string());

    match hash {
        Some(hash) if !hash.is_empty() => format!("{}-{}", pkg_version, hash),
        _ => pkg_version.to_string(),
    }
}
