use std::path::{Path, PathBuf};
use std::process::Command;

/// Stdout of `git <args>` in `repo`, trimmed; None if git is missing or fails.
fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    let manifest = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into()));
    let repo = manifest.parent().unwrap_or(manifest.as_path()).to_path_buf();

    // "3f2a9c1", "3f2a9c1-dirty" with local edits, "unknown" outside a checkout
    let build = match git(&repo, &["rev-parse", "--short", "HEAD"]).filter(|s| !s.is_empty()) {
        Some(sha) => {
            let dirty = git(&repo, &["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|s| !s.is_empty());
            if dirty { format!("{}-dirty", sha) } else { sha }
        }
        None => "unknown".to_string(),
    };

    println!("cargo:rustc-env=CARDWISE_BUILD_SHA={}", build);
}
