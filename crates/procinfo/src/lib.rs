pub mod enumerator;
pub mod error;
pub mod platform;
pub mod record;
pub mod window_titles;

pub use enumerator::{enumerate, NativeEnumerator, ProcessEnumerator};
pub use error::ProcInfoError;
pub use platform::{ProcFs, Unsupported};
#[cfg(windows)]
pub use platform::windows::{User32, Win32Processes};
pub use record::ProcessRecord;
pub use window_titles::{assign_window_titles, TopLevelWindow, WindowService};
