// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process fakes for the platform bridge and the native core.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use skyemu_bridge::field::MemoryTextField;
use skyemu_bridge::traits::*;
use skyemu_core::error::{Result, ShimError};
use skyemu_core::human_errors::HumanError;
use skyemu_core::types::{DisplayMetrics, DocumentLocator};

use crate::native::NativeCore;

#[derive(Debug, Clone)]
struct FakeDocument {
    display_name: Option<String>,
    bytes: Vec<u8>,
    /// Fail with an I/O error once `bytes` are consumed.
    truncated: bool,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Mutex<Vec<String>>,
    documents: Mutex<HashMap<String, FakeDocument>>,
    files_dir: Mutex<Option<PathBuf>>,
    api_level: AtomicI32,
    display_failing: AtomicBool,
}

/// Scriptable bridge. Clones share state, so a test can keep one handle
/// while the context owns another.
#[derive(Debug, Clone)]
pub struct FakeBridge {
    /// The field the "input method" types into.
    pub field: MemoryTextField,
    shared: Arc<Shared>,
}

impl FakeBridge {
    pub fn new() -> Self {
        let shared = Shared::default();
        shared.api_level.store(34, Ordering::Relaxed);
        Self {
            field: MemoryTextField::new(),
            shared: Arc::new(shared),
        }
    }

    pub fn with_files_dir(path: impl Into<PathBuf>) -> Self {
        let bridge = Self::new();
        *bridge.shared.files_dir.lock().unwrap() = Some(path.into());
        bridge
    }

    pub fn set_api_level(&self, level: i32) {
        self.shared.api_level.store(level, Ordering::Relaxed);
    }

    pub fn set_display_failing(&self, failing: bool) {
        self.shared.display_failing.store(failing, Ordering::Relaxed);
    }

    pub fn add_document(&self, uri: &str, display_name: Option<&str>, bytes: &[u8]) {
        self.insert(uri, display_name, bytes, false);
    }

    /// A document whose stream breaks after `bytes`.
    pub fn add_truncated_document(&self, uri: &str, display_name: Option<&str>, bytes: &[u8]) {
        self.insert(uri, display_name, bytes, true);
    }

    fn insert(&self, uri: &str, display_name: Option<&str>, bytes: &[u8], truncated: bool) {
        self.shared.documents.lock().unwrap().insert(
            uri.to_owned(),
            FakeDocument {
                display_name: display_name.map(str::to_owned),
                bytes: bytes.to_vec(),
                truncated,
            },
        );
    }

    /// Every platform call, in order.
    pub fn calls(&self) -> Vec<String> {
        self.shared.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.shared.calls.lock().unwrap().push(call.into());
    }

    fn document(&self, locator: &DocumentLocator) -> Result<FakeDocument> {
        self.shared
            .documents
            .lock()
            .unwrap()
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| ShimError::DocumentUnavailable(locator.to_string()))
    }
}

impl PlatformBridge for FakeBridge {
    fn platform_name(&self) -> &str {
        "Fake"
    }
}

impl NativeKeyboard for FakeBridge {
    fn install_shadow_field(&self) -> Result<Box<dyn ShadowTextField>> {
        self.record("install_shadow_field");
        Ok(Box::new(self.field.clone()))
    }

    fn show_soft_keyboard(&self) -> Result<()> {
        self.record("show_keyboard");
        Ok(())
    }

    fn hide_soft_keyboard(&self) -> Result<()> {
        self.record("hide_keyboard");
        Ok(())
    }
}

impl NativeDisplay for FakeBridge {
    fn display_metrics(&self) -> Result<DisplayMetrics> {
        if self.shared.display_failing.load(Ordering::Relaxed) {
            return Err(ShimError::Bridge("display gone".into()));
        }
        Ok(DisplayMetrics {
            xdpi: 240.0,
            ydpi: 240.0,
            width_px: 1080,
            height_px: 1920,
        })
    }

    fn locale_tag(&self) -> Result<String> {
        if self.shared.display_failing.load(Ordering::Relaxed) {
            return Err(ShimError::Bridge("display gone".into()));
        }
        Ok("fr_FR".into())
    }

    fn api_level(&self) -> Result<i32> {
        Ok(self.shared.api_level.load(Ordering::Relaxed))
    }
}

impl NativeDocumentPicker for FakeBridge {
    fn launch_document_picker(&self, request_code: i32) -> Result<()> {
        self.record(format!("launch_picker:{request_code}"));
        Ok(())
    }

    fn query_display_name(&self, document: &DocumentLocator) -> Result<Option<String>> {
        self.record(format!("query_display_name:{document}"));
        Ok(self.document(document)?.display_name)
    }

    fn open_document(&self, document: &DocumentLocator) -> Result<Box<dyn Read + Send>> {
        let doc = self.document(document)?;
        if doc.truncated {
            Ok(Box::new(Cursor::new(doc.bytes).chain(BrokenStream)))
        } else {
            Ok(Box::new(Cursor::new(doc.bytes)))
        }
    }

    fn external_files_dir(&self) -> Result<PathBuf> {
        self.shared
            .files_dir
            .lock()
            .unwrap()
            .clone()
            .ok_or(ShimError::PlatformUnavailable)
    }
}

impl NativeWindowChrome for FakeBridge {
    fn set_system_ui_visibility(&self, flags: i32) -> Result<()> {
        self.record(format!("system_ui:{flags:#x}"));
        Ok(())
    }
}

struct BrokenStream;

impl Read for BrokenStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "provider went away"))
    }
}

/// Native core that records what it is handed.
#[derive(Debug, Default)]
pub struct RecordingCore {
    loads: Mutex<Vec<PathBuf>>,
    failures: Mutex<Vec<HumanError>>,
}

impl RecordingCore {
    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<HumanError> {
        self.failures.lock().unwrap().clone()
    }
}

impl NativeCore for RecordingCore {
    fn load_file(&self, path: &Path) {
        self.loads.lock().unwrap().push(path.to_path_buf());
    }

    fn import_failed(&self, error: &HumanError) {
        self.failures.lock().unwrap().push(error.clone());
    }
}
