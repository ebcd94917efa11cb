// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! SkyEmu shim: native platform bridge abstractions.
//!
//! Defines the traits the shim uses to reach the Android UI layer (soft
//! keyboard, shadow text field, display metrics, document picker, window
//! chrome) and the platform dispatch that picks an implementation.

pub mod field;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use skyemu_core::error::Result;

/// Build the bridge implementation for the target operating system.
///
/// On Android this reads the `JavaVM` and activity published through
/// `ndk-context`, so the context must be initialised first.
pub fn platform_bridge() -> Result<Box<dyn traits::PlatformBridge>> {
    #[cfg(target_os = "android")]
    {
        Ok(Box::new(android::AndroidBridge::new()?))
    }
    #[cfg(not(target_os = "android"))]
    {
        // Desktop/CI: no native UI, every capability reports unavailable.
        Ok(Box::new(stub::StubBridge))
    }
}
