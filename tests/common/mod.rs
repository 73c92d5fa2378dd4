#![allow(dead_code)]

pub use prun_test_utils::builders;
pub use prun_test_utils::fake_runner;
pub use prun_test_utils::{init_tracing, with_timeout};

/// Whether a process with this pid still exists (unix only).
#[cfg(unix)]
pub fn pid_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
