// src/streak/log_file.rs

//! Persisted failure log for `prunfail`.
//!
//! The log is a small text file: recent captured output followed by a
//! trailer line `<timestamp> fail <count>\n`. It is small enough to read
//! and rewrite whole on every invocation. Rewrites go through a sibling
//! temp file and a rename, so readers see either the old log or the new one.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{PrunError, Result};

/// Upper bound on the log's data section, and on captured output.
pub const MAX_LOG_SIZE: usize = 16384;

const TRAILER_PREFIX: &str = "fail ";

#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    data: Vec<u8>,
    /// Consecutive failures recorded so far.
    pub failures: u32,
}

impl FailureLog {
    /// Open (creating if needed) and parse the log at `path`.
    ///
    /// A non-empty log without a valid trailer is an error; it is never
    /// reset silently.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let failures = parse_trailer(&data)?;
        debug!(path = ?path, failures, "opened failure log");
        Ok(Self {
            path,
            data,
            failures,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `output` and rewrite the file with a fresh trailer.
    pub fn write(&mut self, output: &[u8]) -> Result<()> {
        let mut content = Vec::with_capacity(self.data.len() + output.len() + 64);
        content.extend_from_slice(&self.data);
        content.extend_from_slice(output);
        if content.len() > MAX_LOG_SIZE {
            content.drain(..content.len() - MAX_LOG_SIZE);
        }

        let stamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        content.extend_from_slice(format!("{stamp} {TRAILER_PREFIX}{}\n", self.failures).as_bytes());

        replace_file(&self.path, &content)?;
        debug!(path = ?self.path, failures = self.failures, bytes = content.len(), "wrote failure log");
        self.data = content;
        Ok(())
    }
}

fn replace_file(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PrunError::Io(e.error))?;
    Ok(())
}

/// Extract the failure count from a log's trailer.
pub fn parse_trailer(data: &[u8]) -> Result<u32> {
    if data.is_empty() {
        return Ok(0);
    }

    let prefix = TRAILER_PREFIX.as_bytes();
    let start = data
        .windows(prefix.len())
        .rposition(|w| w == prefix)
        .ok_or_else(|| PrunError::CorruptLog("missing trailer".to_string()))?;

    let tail = &data[start + prefix.len()..];
    let digits = tail
        .strip_suffix(b"\n")
        .ok_or_else(|| PrunError::CorruptLog("trailer is not newline-terminated".to_string()))?;

    let text = std::str::from_utf8(digits)
        .map_err(|_| PrunError::CorruptLog("trailer is not valid text".to_string()))?;
    text.parse::<u32>()
        .map_err(|e| PrunError::CorruptLog(format!("bad failure count {text:?}: {e}")))
}
