// Platform backends.
//
// `procfs` and `unsupported` build everywhere so callers can pick them
// explicitly; `windows` only exists on Windows targets.

mod procfs;
mod unsupported;

#[cfg(windows)]
pub mod windows;

pub use procfs::{parse_pid, ProcFs};
pub use unsupported::Unsupported;
