// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the Android UI layer is absent.
//
// Capabilities that need a real view hierarchy return `PlatformUnavailable`.
// The shadow field is backed by memory so the key-event path still works.

use std::io::Read;
use std::path::PathBuf;

use skyemu_core::error::{Result, ShimError};
use skyemu_core::types::{DisplayMetrics, DocumentLocator};

use crate::field::MemoryTextField;
use crate::traits::*;

/// No-op bridge returned on non-Android platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeKeyboard for StubBridge {
    fn install_shadow_field(&self) -> Result<Box<dyn ShadowTextField>> {
        Ok(Box::new(MemoryTextField::new()))
    }

    fn show_soft_keyboard(&self) -> Result<()> {
        tracing::warn!("NativeKeyboard::show_soft_keyboard called on stub bridge");
        Err(ShimError::PlatformUnavailable)
    }

    fn hide_soft_keyboard(&self) -> Result<()> {
        tracing::warn!("NativeKeyboard::hide_soft_keyboard called on stub bridge");
        Err(ShimError::PlatformUnavailable)
    }
}

impl NativeDisplay for StubBridge {
    fn display_metrics(&self) -> Result<DisplayMetrics> {
        Err(ShimError::PlatformUnavailable)
    }

    fn locale_tag(&self) -> Result<String> {
        Err(ShimError::PlatformUnavailable)
    }

    fn api_level(&self) -> Result<i32> {
        Err(ShimError::PlatformUnavailable)
    }
}

impl NativeDocumentPicker for StubBridge {
    fn launch_document_picker(&self, _request_code: i32) -> Result<()> {
        tracing::warn!("NativeDocumentPicker::launch_document_picker called on stub bridge");
        Err(ShimError::PlatformUnavailable)
    }

    fn query_display_name(&self, _document: &DocumentLocator) -> Result<Option<String>> {
        Err(ShimError::PlatformUnavailable)
    }

    fn open_document(&self, _document: &DocumentLocator) -> Result<Box<dyn Read + Send>> {
        Err(ShimError::PlatformUnavailable)
    }

    fn external_files_dir(&self) -> Result<PathBuf> {
        Err(ShimError::PlatformUnavailable)
    }
}

impl NativeWindowChrome for StubBridge {
    fn set_system_ui_visibility(&self, _flags: i32) -> Result<()> {
        Err(ShimError::PlatformUnavailable)
    }
}
