// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native capabilities the shim
// needs. Every method that touches views must be called on the UI thread.

use std::io::Read;
use std::path::PathBuf;

use skyemu_core::error::Result;
use skyemu_core::types::{DisplayMetrics, DocumentLocator, FieldSnapshot};

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge:
    NativeKeyboard + NativeDisplay + NativeDocumentPicker + NativeWindowChrome + Send + Sync
{
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;
}

/// The invisible edit field the input method types into.
///
/// Offsets are counted in Unicode scalar values.
pub trait ShadowTextField: Send {
    /// Current text and cursor (selection end).
    fn snapshot(&self) -> Result<FieldSnapshot>;

    /// Replace the whole text and place the cursor.
    fn reset(&mut self, text: &str, cursor: usize) -> Result<()>;

    /// Move the cursor without touching the text.
    fn set_cursor(&mut self, cursor: usize) -> Result<()>;
}

/// Soft keyboard and the field it edits.
pub trait NativeKeyboard {
    /// Create the shadow field, attach it to the content view seeded with the
    /// sentinel baseline, and suppress the input method until it is shown.
    fn install_shadow_field(&self) -> Result<Box<dyn ShadowTextField>>;

    /// Allow the input method, focus the shadow field and show the keyboard.
    fn show_soft_keyboard(&self) -> Result<()>;

    /// Suppress the input method and hide the keyboard.
    fn hide_soft_keyboard(&self) -> Result<()>;
}

/// Display and locale queries.
pub trait NativeDisplay {
    /// Metrics of the real (unscaled) display.
    fn display_metrics(&self) -> Result<DisplayMetrics>;

    /// Default locale in `language_COUNTRY` form, e.g. "en_US".
    fn locale_tag(&self) -> Result<String>;

    /// `Build.VERSION.SDK_INT`
    fn api_level(&self) -> Result<i32>;
}

/// The system "open document" flow and access to what it returns.
pub trait NativeDocumentPicker {
    /// Launch the picker. The result arrives later through the activity's
    /// result callback tagged with `request_code`.
    fn launch_document_picker(&self, request_code: i32) -> Result<()>;

    /// Display name the document provider reports, if any.
    fn query_display_name(&self, document: &DocumentLocator) -> Result<Option<String>>;

    /// Open the document's bytes for streaming.
    fn open_document(&self, document: &DocumentLocator) -> Result<Box<dyn Read + Send>>;

    /// App-private external files directory.
    fn external_files_dir(&self) -> Result<PathBuf>;
}

/// Window decoration (system bars).
pub trait NativeWindowChrome {
    /// Set `View.setSystemUiVisibility` flags on the decor view.
    fn set_system_ui_visibility(&self, flags: i32) -> Result<()>;
}
