// src/exec/command.rs

//! Command descriptions and executable lookup.

use std::fmt;
use std::path::{Path, PathBuf};

/// An executable name plus the arguments it is invoked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Same executable, different arguments.
    pub fn with_args(&self, args: Vec<String>) -> Self {
        Self {
            name: self.name.clone(),
            args,
        }
    }

    /// Whether `name` should be looked up through `PATH`.
    pub fn needs_lookup(&self) -> bool {
        !self.name.is_empty() && !self.name.chars().any(std::path::is_separator)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.args.join(" "))
        }
    }
}

/// Resolve a bare command name against the directories in `path_var`.
///
/// Returns the first candidate that is a regular file and, on unix, has an
/// execute bit set.
pub fn resolve_in_path(name: &str, path_var: &std::ffi::OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| {
            // An empty PATH entry means the current directory.
            if dir.as_os_str().is_empty() {
                PathBuf::from(".").join(name)
            } else {
                dir.join(name)
            }
        })
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
