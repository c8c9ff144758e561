//! Stamps the binary with the commit it was built from and the build time,
//! read back by the `/version` route as `DOCPORT_COMMIT` / `DOCPORT_BUILT`.

use std::process::Command;

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

fn main() {
    let commit = short_commit().unwrap_or_else(|| "unknown".to_string());
    let built = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    println!("cargo:rustc-env=DOCPORT_COMMIT={}", commit);
    println!("cargo:rustc-env=DOCPORT_BUILT={}", built);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
