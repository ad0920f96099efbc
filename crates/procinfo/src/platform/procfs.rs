// POSIX backend — walks a process pseudo-filesystem such as /proc.
//
// For every numeric directory entry:
//   1. status  → "Name:" line gives the kernel-reported name
//   2. cmdline → NUL-separated argv, used for the command line and to
//                recover names the kernel truncated

use std::fs;
use std::path::{Path, PathBuf};

use crate::enumerator::ProcessEnumerator;
use crate::error::ProcInfoError;
use crate::record::ProcessRecord;

const DEFAULT_ROOT: &str = "/proc";
const NAME_KEY: &str = "Name:";

/// Reads process records from a procfs-style directory tree.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    /// Backend over the system `/proc`.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    /// Backend over an alternate process directory (containers, tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the pids under the root directory.
    pub fn list_pids(&self) -> Result<Vec<u32>, ProcInfoError> {
        Ok(self.pid_entries()?.into_iter().map(|(_, pid)| pid).collect())
    }

    /// Build the record for one pid from `<root>/<pid>`.
    ///
    /// Always returns a record; unreadable files leave their fields empty.
    pub fn read_process(&self, pid: u32) -> ProcessRecord {
        self.read_entry(&pid.to_string(), pid)
    }

    /// Numeric entries under the root, keyed by their directory name so
    /// `007` is read from `007/` rather than `7/`.
    fn pid_entries(&self) -> Result<Vec<(String, u32)>, ProcInfoError> {
        let entries = fs::read_dir(&self.root)?;
        Ok(entries
            .filter_map(Result::ok)
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                let pid = parse_pid(&name)?;
                Some((name, pid))
            })
            .collect())
    }

    fn read_entry(&self, entry: &str, pid: u32) -> ProcessRecord {
        let dir = self.root.join(entry);
        let mut record = ProcessRecord::new(pid);

        match read_status_name(&dir.join("status")) {
            Ok(Some(name)) => record.name = name,
            Ok(None) => {}
            Err(e) => tracing::trace!(pid, error = %e, "status unreadable"),
        }

        match fs::read(dir.join("cmdline")) {
            Ok(raw) => apply_cmdline(&mut record, &raw, |path| Path::new(path).exists()),
            Err(e) => tracing::trace!(pid, error = %e, "cmdline unreadable"),
        }

        record
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessEnumerator for ProcFs {
    fn enumerate(&self) -> Vec<ProcessRecord> {
        let entries = match self.pid_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    root = %self.root().display(),
                    error = %e,
                    "cannot list process directory"
                );
                return Vec::new();
            }
        };

        entries
            .iter()
            .map(|(entry, pid)| self.read_entry(entry, *pid))
            .collect()
    }
}

/// Parse a directory entry name as a pid.
///
/// Only plain ASCII decimal digits are accepted, so `self`, `+1` or `1a`
/// are rejected.
pub fn parse_pid(entry: &str) -> Option<u32> {
    if entry.is_empty() || !entry.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    entry.parse().ok()
}

fn read_status_name(path: &Path) -> Result<Option<String>, ProcInfoError> {
    let raw = fs::read(path)?;
    Ok(parse_status_name(&String::from_utf8_lossy(&raw)))
}

/// First `Name:` line of a status file, with the key and whitespace removed.
fn parse_status_name(contents: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix(NAME_KEY))
        .map(|name| name.trim().to_string())
}

/// Fold raw cmdline bytes into `record`.
///
/// The kernel caps the status name at a few characters, so when argv[0]
/// starts with that name and exists on disk it replaces the name. With no
/// status name at all, argv[0] is used in brackets.
///
/// A cmdline whose first byte is NUL has no usable argv[0] and yields an
/// empty command line.
fn apply_cmdline(record: &mut ProcessRecord, raw: &[u8], path_exists: impl Fn(&str) -> bool) {
    match raw.iter().position(|&b| b == 0) {
        Some(0) => return,
        Some(first_len) => {
            let first = String::from_utf8_lossy(&raw[..first_len]);

            if first.starts_with(record.name.as_str()) && path_exists(&*first) {
                record.name = first.to_string();
            }
            if record.name.is_empty() {
                record.name = format!("[{first}]");
            }
        }
        None => {}
    }

    let joined: Vec<u8> = raw.iter().map(|&b| if b == 0 { b' ' } else { b }).collect();
    record.command_line = String::from_utf8_lossy(&joined).trim().to_string();
}
