//! Association of top-level window titles with process records.
//!
//! The desktop is abstracted behind [`WindowService`] so the matching rules
//! work the same against the Win32 window list and against in-memory fakes.

use std::collections::HashMap;

use crate::record::ProcessRecord;

/// A top-level window as seen during desktop enumeration.
pub trait TopLevelWindow {
    /// Pid of the process that created the window.
    fn process_id(&self) -> u32;

    /// Whether the window has an owner window (dialogs, tool windows).
    fn has_owner(&self) -> bool;

    fn is_visible(&self) -> bool;

    /// Window text. Only read for windows that end up supplying a title.
    fn text(&self) -> String;
}

/// Enumerates the top-level windows of the desktop.
pub trait WindowService {
    /// False when the underlying window API could not be loaded.
    fn is_available(&self) -> bool;

    /// Visit every top-level window in the order the OS reports them.
    fn for_each_window(&self, visit: &mut dyn FnMut(&dyn TopLevelWindow));
}

/// Fill `window_title` of each record from the first visible, unowned
/// top-level window belonging to its pid.
///
/// Later windows for a pid never overwrite the first one. Windows whose pid
/// has no record are ignored. Does nothing when the service is unavailable.
pub fn assign_window_titles(records: &mut [ProcessRecord], service: &dyn WindowService) {
    if !service.is_available() {
        return;
    }

    let mut by_pid: HashMap<u32, usize> = HashMap::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        by_pid.entry(record.pid).or_insert(idx);
    }
    let mut titled = vec![false; records.len()];

    service.for_each_window(&mut |window| {
        let pid = window.process_id();
        if window.has_owner() || !window.is_visible() {
            return;
        }
        let Some(&idx) = by_pid.get(&pid) else {
            return;
        };
        if titled[idx] {
            return;
        }
        records[idx].window_title = window.text();
        titled[idx] = true;
    });

    tracing::trace!(
        titled = titled.iter().filter(|t| **t).count(),
        "window titles assigned"
    );
}
