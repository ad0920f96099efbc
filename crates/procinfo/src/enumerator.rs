use crate::record::ProcessRecord;

/// A source of process records.
///
/// Implementations never fail: anything they cannot read degrades to an
/// empty field, or to an empty collection when the process table itself is
/// unavailable. Each call performs a fresh scan.
pub trait ProcessEnumerator {
    fn enumerate(&self) -> Vec<ProcessRecord>;
}

/// The backend compiled in for the current target.
#[cfg(windows)]
pub type NativeEnumerator = crate::platform::windows::Win32Processes;

#[cfg(unix)]
pub type NativeEnumerator = crate::platform::ProcFs;

#[cfg(not(any(unix, windows)))]
pub type NativeEnumerator = crate::platform::Unsupported;

/// Enumerate running processes with the native backend.
///
/// The result is unordered.
pub fn enumerate() -> Vec<ProcessRecord> {
    NativeEnumerator::default().enumerate()
}
