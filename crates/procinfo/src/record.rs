use serde::{Deserialize, Serialize};

/// One process observed at enumeration time.
///
/// Every field except `pid` is best-effort: anything the backend could not
/// read is left as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// Title of a visible, unowned top-level window of the process.
    pub window_title: String,
    pub command_line: String,
}

impl ProcessRecord {
    /// Create a record for `pid` with all other fields empty.
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            ..Default::default()
        }
    }

    pub fn has_window(&self) -> bool {
        !self.window_title.is_empty()
    }

    /// Case-insensitive substring match against name, window title and
    /// command line. An empty needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        [&self.name, &self.window_title, &self.command_line]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
