// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The native emulator core, as seen from the shim.

use std::ffi::{c_char, CString};
use std::path::Path;

use tracing::warn;

use skyemu_core::human_errors::HumanError;

/// Entry points the native core provides to the shim.
pub trait NativeCore: Send + Sync {
    /// Load a file the player imported. Called once per successful import.
    fn load_file(&self, path: &Path);

    /// An import failed. The default ignores it.
    fn import_failed(&self, _error: &HumanError) {}
}

/// `void load_file(const char* path)`
pub type LoadFileFn = unsafe extern "C" fn(path: *const c_char);

/// `void import_failed(const char* message, const char* suggestion)`
pub type ImportFailedFn = unsafe extern "C" fn(message: *const c_char, suggestion: *const c_char);

/// A native core registered through the C ABI as plain function pointers.
#[derive(Debug, Clone, Copy)]
pub struct CallbackCore {
    load_file: LoadFileFn,
    import_failed: Option<ImportFailedFn>,
}

impl CallbackCore {
    pub fn new(load_file: LoadFileFn, import_failed: Option<ImportFailedFn>) -> Self {
        Self {
            load_file,
            import_failed,
        }
    }
}

fn c_string(text: &str, what: &str) -> Option<CString> {
    match CString::new(text) {
        Ok(s) => Some(s),
        Err(_) => {
            warn!(what, "string contains NUL, not passed to native core");
            None
        }
    }
}

impl NativeCore for CallbackCore {
    fn load_file(&self, path: &Path) {
        let Some(path) = c_string(&path.to_string_lossy(), "path") else {
            return;
        };
        // SAFETY: the pointer is valid and NUL-terminated for the duration of
        // the call; the core must copy it if it keeps it.
        unsafe { (self.load_file)(path.as_ptr()) }
    }

    fn import_failed(&self, error: &HumanError) {
        let Some(callback) = self.import_failed else {
            return;
        };
        let (Some(message), Some(suggestion)) = (
            c_string(&error.message, "message"),
            c_string(&error.suggestion, "suggestion"),
        ) else {
            return;
        };
        // SAFETY: as for `load_file`.
        unsafe { callback(message.as_ptr(), suggestion.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::sync::Mutex;

    use skyemu_core::human_errors::Severity;

    // Function pointers cannot capture, so each test owns a static sink.
    static LOADED: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static FAILED: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());

    unsafe extern "C" fn record_load(path: *const c_char) {
        let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();
        LOADED.lock().unwrap().push(path);
    }

    unsafe extern "C" fn record_failure(message: *const c_char, suggestion: *const c_char) {
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
        let suggestion = unsafe { CStr::from_ptr(suggestion) }.to_string_lossy().into_owned();
        FAILED.lock().unwrap().push((message, suggestion));
    }

    #[test]
    fn load_file_passes_c_path() {
        let core = CallbackCore::new(record_load, None);
        core.load_file(Path::new("/data/files/rom.gba"));
        core.load_file(Path::new("/bad\0path"));
        assert_eq!(*LOADED.lock().unwrap(), vec!["/data/files/rom.gba".to_string()]);
    }

    #[test]
    fn import_failed_is_optional() {
        let error = HumanError {
            message: "The chosen file couldn't be read.".into(),
            suggestion: "Pick it again.".into(),
            severity: Severity::ActionRequired,
        };

        CallbackCore::new(record_load, None).import_failed(&error);
        assert!(FAILED.lock().unwrap().is_empty());

        CallbackCore::new(record_load, Some(record_failure)).import_failed(&error);
        assert_eq!(
            *FAILED.lock().unwrap(),
            vec![(error.message.clone(), error.suggestion.clone())]
        );
    }
}
