use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_stdout("git", &["rev-parse", "--short", "HEAD"])
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".into());
    let status = match command_stdout("git", &["status", "--porcelain"]) {
        Some(changes) if changes.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let rustc = command_stdout("rustc", &["--version"]).unwrap_or_else(|| "unknown".into());

    let vars = [
        ("TRIO_BUILD_HASH", hash),
        ("TRIO_BUILD_STATUS", status.to_string()),
        ("TRIO_BUILD_TIMESTAMP", timestamp),
        ("TRIO_BUILD_TARGET", env_or("TARGET", "unknown-target")),
        ("TRIO_BUILD_PROFILE", env_or("PROFILE", "unknown-profile")),
        ("TRIO_BUILD_RUSTC", rustc),
    ];
    for (name, value) in vars {
        println!("cargo:rustc-env={name}={value}");
    }
}

fn env_or(name: &str, fallback: &str) -> String {
    env::var(name).unwrap_or_else(|_| fallback.to_string())
}

/// Trimmed stdout of a successful command, `None` otherwise.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
