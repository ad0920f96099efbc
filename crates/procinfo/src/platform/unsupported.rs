use crate::enumerator::ProcessEnumerator;
use crate::record::ProcessRecord;

/// Backend for targets without a process table implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl ProcessEnumerator for Unsupported {
    fn enumerate(&self) -> Vec<ProcessRecord> {
        tracing::warn!("process enumeration not supported on this platform");
        Vec::new()
    }
}
