// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! SkyEmu Android shim.
//!
//! Sits between the Android activity and the native emulator core. The
//! activity reports layout, configuration, picker and permission results
//! through JNI; the core polls key events, visible area, DPI scale and
//! locale through a small C ABI, and receives imported files by path.
//!
//! All state lives in one [`context::ShimContext`]. The C ABI reaches it
//! through the slot in [`ffi`].
//!
//! # Migrating from the Java activity
//!
//! The previous `EnhancedNativeActivity` kept this logic in Java and handed
//! imported files to the core through its `native void
//! se_android_load_file(String)` method, implemented by the C core. With this
//! crate both sides change:
//!
//! - The activity keeps its views and lifecycle but forwards every callback
//!   to the `native*` methods listed in `android_jni.rs` (`nativeOnCreate`,
//!   `nativeOnGlobalLayout`, `nativeOnActivityResult` and the rest). It must
//!   call `nativeRunUiTasks` from its UI thread every frame; keyboard,
//!   picker and immersive requests from the core run there.
//! - The C core drops its `Java_com_sky_SkyEmu_EnhancedNativeActivity_se_1android_1load_1file`
//!   export and calls [`ffi::se_android_register_core`] once at start-up
//!   with its `load_file` callback (and optionally `import_failed`). The
//!   `se_android_get_*`, `se_android_*_keyboard` and `se_android_open_file`
//!   entry points replace the JNI calls it used to make into the activity.

pub mod context;
pub mod events;
pub mod ffi;
pub mod geometry;
pub mod immersive;
pub mod import;
pub mod keyboard;
pub mod logging;
pub mod native;
pub mod permissions;
pub mod ui;

#[cfg(target_os = "android")]
mod android_jni;

#[cfg(test)]
mod test_support;

pub use context::ShimContext;
pub use import::ImportOutcome;
pub use native::NativeCore;
pub use ui::Completion;
