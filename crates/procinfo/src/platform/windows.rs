// Windows backend — toolhelp snapshot for the process list, user32 for
// window titles.
//
// user32 is loaded at runtime and every window function is resolved by
// name. If any of them is missing the title pass is skipped and the
// snapshot records are returned as-is.

use std::mem::transmute;

use windows_sys::Win32::Foundation::{
    CloseHandle, BOOL, HANDLE, HMODULE, HWND, INVALID_HANDLE_VALUE, LPARAM,
};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W, TH32CS_SNAPPROCESS,
};
use windows_sys::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryA};
use windows_sys::Win32::UI::WindowsAndMessaging::{GW_OWNER, WNDENUMPROC};

use crate::enumerator::ProcessEnumerator;
use crate::error::ProcInfoError;
use crate::record::ProcessRecord;
use crate::window_titles::{assign_window_titles, TopLevelWindow, WindowService};

const CONTINUE_ENUMERATION: BOOL = 1;

type RawProc = unsafe extern "system" fn() -> isize;
type GetWindowThreadProcessIdFn = unsafe extern "system" fn(HWND, *mut u32) -> u32;
type GetWindowFn = unsafe extern "system" fn(HWND, u32) -> HWND;
type IsWindowVisibleFn = unsafe extern "system" fn(HWND) -> BOOL;
type GetWindowTextLengthWFn = unsafe extern "system" fn(HWND) -> i32;
type GetWindowTextWFn = unsafe extern "system" fn(HWND, *mut u16, i32) -> i32;
type EnumWindowsFn = unsafe extern "system" fn(WNDENUMPROC, LPARAM) -> BOOL;

/// Process enumeration via `CreateToolhelp32Snapshot` plus top-level window
/// titles from user32.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Processes;

impl ProcessEnumerator for Win32Processes {
    fn enumerate(&self) -> Vec<ProcessRecord> {
        let mut records = match Snapshot::processes() {
            Ok(snapshot) => snapshot.records(),
            Err(e) => {
                tracing::debug!(error = %e, "process snapshot unavailable");
                return Vec::new();
            }
        };

        let user32 = User32::load();
        assign_window_titles(&mut records, &user32);
        records
    }
}

// ---------------------------------------------------------------------------
// Process snapshot
// ---------------------------------------------------------------------------

/// Toolhelp snapshot handle, closed on drop.
struct Snapshot(HANDLE);

impl Snapshot {
    fn processes() -> Result<Self, ProcInfoError> {
        let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(ProcInfoError::Snapshot(std::io::Error::last_os_error().to_string()));
        }
        Ok(Self(handle))
    }

    fn records(&self) -> Vec<ProcessRecord> {
        let mut records = Vec::new();

        let mut entry: PROCESSENTRY32W = unsafe { std::mem::zeroed() };
        entry.dwSize =
            u32::try_from(std::mem::size_of::<PROCESSENTRY32W>()).unwrap_or(u32::MAX);

        if unsafe { Process32FirstW(self.0, &mut entry) } == 0 {
            return records;
        }
        loop {
            records.push(ProcessRecord {
                pid: entry.th32ProcessID,
                name: wide_to_string(&entry.szExeFile),
                ..Default::default()
            });

            if unsafe { Process32NextW(self.0, &mut entry) } == 0 {
                break;
            }
        }

        records
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.0) };
    }
}

/// UTF-16 buffer up to its first NUL.
fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

// ---------------------------------------------------------------------------
// user32 window API
// ---------------------------------------------------------------------------

/// Dynamically loaded module, freed on drop.
struct Library(HMODULE);

impl Library {
    fn load(name: &'static [u8]) -> Result<Self, ProcInfoError> {
        let module = unsafe { LoadLibraryA(name.as_ptr()) };
        if module.is_null() {
            return Err(ProcInfoError::WindowApiUnavailable(format!(
                "cannot load {}",
                c_name(name)
            )));
        }
        Ok(Self(module))
    }

    fn symbol(&self, name: &'static [u8]) -> Result<RawProc, ProcInfoError> {
        unsafe { GetProcAddress(self.0, name.as_ptr()) }.ok_or_else(|| {
            ProcInfoError::WindowApiUnavailable(format!("missing symbol {}", c_name(name)))
        })
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        unsafe { FreeLibrary(self.0) };
    }
}

fn c_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned()
}

struct User32Api {
    _library: Library,
    get_window_thread_process_id: GetWindowThreadProcessIdFn,
    get_window: GetWindowFn,
    is_window_visible: IsWindowVisibleFn,
    get_window_text_length_w: GetWindowTextLengthWFn,
    get_window_text_w: GetWindowTextWFn,
    enum_windows: EnumWindowsFn,
}

impl User32Api {
    fn load() -> Result<Self, ProcInfoError> {
        let library = Library::load(b"user32.dll\0")?;

        // Resolved symbols are transmuted to their documented signatures.
        unsafe {
            Ok(Self {
                get_window_thread_process_id: transmute::<RawProc, GetWindowThreadProcessIdFn>(
                    library.symbol(b"GetWindowThreadProcessId\0")?,
                ),
                get_window: transmute::<RawProc, GetWindowFn>(library.symbol(b"GetWindow\0")?),
                is_window_visible: transmute::<RawProc, IsWindowVisibleFn>(
                    library.symbol(b"IsWindowVisible\0")?,
                ),
                get_window_text_length_w: transmute::<RawProc, GetWindowTextLengthWFn>(
                    library.symbol(b"GetWindowTextLengthW\0")?,
                ),
                get_window_text_w: transmute::<RawProc, GetWindowTextWFn>(
                    library.symbol(b"GetWindowTextW\0")?,
                ),
                enum_windows: transmute::<RawProc, EnumWindowsFn>(
                    library.symbol(b"EnumWindows\0")?,
                ),
                _library: library,
            })
        }
    }
}

/// Top-level window enumeration backed by a runtime-loaded user32.
///
/// Unavailable when user32 or any required export could not be resolved.
/// The library is released when this value is dropped.
pub struct User32 {
    api: Option<User32Api>,
}

impl User32 {
    pub fn load() -> Self {
        match User32Api::load() {
            Ok(api) => Self { api: Some(api) },
            Err(e) => {
                tracing::debug!(error = %e, "window titles disabled");
                Self { api: None }
            }
        }
    }
}

impl WindowService for User32 {
    fn is_available(&self) -> bool {
        self.api.is_some()
    }

    fn for_each_window(&self, visit: &mut dyn FnMut(&dyn TopLevelWindow)) {
        let Some(api) = &self.api else {
            return;
        };
        let mut ctx = EnumContext { api, visit };
        unsafe {
            (api.enum_windows)(Some(visit_window), std::ptr::addr_of_mut!(ctx) as LPARAM);
        }
    }
}

struct EnumContext<'a, 'v> {
    api: &'a User32Api,
    visit: &'v mut dyn FnMut(&dyn TopLevelWindow),
}

unsafe extern "system" fn visit_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let ctx = &mut *(lparam as *mut EnumContext<'_, '_>);
    let window = Win32Window { hwnd, api: ctx.api };
    (ctx.visit)(&window);
    CONTINUE_ENUMERATION
}

struct Win32Window<'a> {
    hwnd: HWND,
    api: &'a User32Api,
}

impl TopLevelWindow for Win32Window<'_> {
    fn process_id(&self) -> u32 {
        let mut pid = 0u32;
        unsafe { (self.api.get_window_thread_process_id)(self.hwnd, &mut pid) };
        pid
    }

    fn has_owner(&self) -> bool {
        !unsafe { (self.api.get_window)(self.hwnd, GW_OWNER) }.is_null()
    }

    fn is_visible(&self) -> bool {
        unsafe { (self.api.is_window_visible)(self.hwnd) != 0 }
    }

    fn text(&self) -> String {
        let len = unsafe { (self.api.get_window_text_length_w)(self.hwnd) };
        let Ok(capacity) = usize::try_from(len) else {
            return String::new();
        };
        let mut buf = vec![0u16; capacity + 1];
        unsafe { (self.api.get_window_text_w)(self.hwnd, buf.as_mut_ptr(), len + 1) };
        buf[capacity] = 0;
        wide_to_string(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_string_stops_at_nul() {
        let mut buf = [0u16; 8];
        for (slot, c) in buf.iter_mut().zip("cmd.exe".encode_utf16()) {
            *slot = c;
        }
        assert_eq!(wide_to_string(&buf), "cmd.exe");
        assert_eq!(wide_to_string(&[0u16; 4]), "");
    }

    #[test]
    fn user32_loads_on_desktop_windows() {
        let user32 = User32::load();
        assert!(user32.is_available());
    }

    #[test]
    fn snapshot_contains_current_process() {
        let records = Win32Processes.enumerate();
        let me = std::process::id();
        assert!(records.iter().any(|r| r.pid == me && !r.name.is_empty()));
    }
}
