// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C ABI for the native emulator core.
//
// The core has no handle to pass around, so the live context sits in one
// process-wide slot, installed when the activity is created and removed when
// it is destroyed. Without a context every getter returns a neutral value.
// No call panics across the boundary.
//
// Imported files reach the core through the callback it passes to
// `se_android_register_core`, not through a JNI method on the activity.

use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use tracing::{error, info};

use skyemu_core::types::NO_EVENT;

use crate::context::ShimContext;
use crate::native::{CallbackCore, ImportFailedFn, LoadFileFn, NativeCore};

static CONTEXT: RwLock<Option<Arc<ShimContext>>> = RwLock::new(None);

/// Registered before or after the context exists; attached on install.
static CORE: RwLock<Option<Arc<dyn NativeCore>>> = RwLock::new(None);

/// Make `ctx` the live context, attaching the registered native core.
/// Returns the context it replaces.
pub fn install(ctx: Arc<ShimContext>) -> Option<Arc<ShimContext>> {
    ctx.set_native_core(registered_core());
    let previous = CONTEXT.write().unwrap_or_else(|e| e.into_inner()).replace(ctx);
    info!(replaced = previous.is_some(), "shim context installed");
    previous
}

/// Remove the live context.
pub fn uninstall() -> Option<Arc<ShimContext>> {
    let previous = CONTEXT.write().unwrap_or_else(|e| e.into_inner()).take();
    if previous.is_some() {
        info!("shim context removed");
    }
    previous
}

pub fn current() -> Option<Arc<ShimContext>> {
    CONTEXT.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Register (or with `None`, forget) the native core.
pub fn register_core(core: Option<Arc<dyn NativeCore>>) {
    *CORE.write().unwrap_or_else(|e| e.into_inner()) = core.clone();
    if let Some(ctx) = current() {
        ctx.set_native_core(core);
    }
}

fn registered_core() -> Option<Arc<dyn NativeCore>> {
    CORE.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Run `f` against the live context, or return `neutral`.
fn with_context<T>(name: &str, neutral: T, f: impl FnOnce(&ShimContext) -> T) -> T {
    let Some(ctx) = current() else {
        return neutral;
    };
    match catch_unwind(AssertUnwindSafe(|| f(&ctx))) {
        Ok(value) => value,
        Err(_) => {
            error!(call = name, "panic caught at the C boundary");
            neutral
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Next key-event code, `-1` when none is pending.
#[unsafe(no_mangle)]
pub extern "C" fn se_android_get_event() -> i32 {
    with_context("get_event", NO_EVENT, ShimContext::next_event)
}

#[unsafe(no_mangle)]
pub extern "C" fn se_android_get_visible_top() -> f32 {
    with_context("get_visible_top", 0.0, ShimContext::visible_top)
}

#[unsafe(no_mangle)]
pub extern "C" fn se_android_get_visible_bottom() -> f32 {
    with_context("get_visible_bottom", 0.0, ShimContext::visible_bottom)
}

#[unsafe(no_mangle)]
pub extern "C" fn se_android_get_dpi_scale() -> f32 {
    with_context("get_dpi_scale", 1.0, ShimContext::dpi_scale)
}

/// Copy the locale tag into `buf` as a NUL-terminated string, truncated to
/// fit `cap` bytes. Returns the full tag length, `0` without a context.
///
/// # Safety
///
/// `buf` must be null or valid for writes of `cap` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn se_android_get_language(buf: *mut c_char, cap: usize) -> usize {
    let tag = with_context("get_language", None, |ctx| Some(ctx.language()));
    let Some(tag) = tag else {
        if !buf.is_null() && cap > 0 {
            // SAFETY: `buf` is valid for at least one byte.
            unsafe { *buf = 0 };
        }
        return 0;
    };
    if !buf.is_null() && cap > 0 {
        let bytes = tag.as_bytes();
        let n = bytes.len().min(cap - 1);
        // SAFETY: `n + 1 <= cap` and the caller guarantees `cap` writable bytes.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
            *buf.add(n) = 0;
        }
    }
    tag.len()
}

// ---------------------------------------------------------------------------
// Requests (run on the UI thread later)
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn se_android_show_keyboard() {
    with_context("show_keyboard", (), |ctx| drop(ctx.show_keyboard()));
}

#[unsafe(no_mangle)]
pub extern "C" fn se_android_hide_keyboard() {
    with_context("hide_keyboard", (), |ctx| drop(ctx.hide_keyboard()));
}

#[unsafe(no_mangle)]
pub extern "C" fn se_android_poll_keyboard() {
    with_context("poll_keyboard", (), |ctx| drop(ctx.request_keyboard_poll()));
}

#[unsafe(no_mangle)]
pub extern "C" fn se_android_open_file() {
    with_context("open_file", (), |ctx| drop(ctx.open_document()));
}

/// Register the core's callbacks. A null `load_file` unregisters the core;
/// `import_failed` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn se_android_register_core(
    load_file: Option<LoadFileFn>,
    import_failed: Option<ImportFailedFn>,
) {
    let core = load_file.map(|load| Arc::new(CallbackCore::new(load, import_failed)) as Arc<dyn NativeCore>);
    info!(registered = core.is_some(), "native core registration");
    register_core(core);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use skyemu_core::config::ShimConfig;
    use skyemu_core::types::{KeyEvent, VisibleRect, BATCH_MARKER};

    use crate::test_support::{FakeBridge, RecordingCore};

    // The slot is process-wide; tests touching it take turns.
    static SLOT: Mutex<()> = Mutex::new(());

    fn language(cap: usize) -> (usize, Vec<u8>) {
        let mut buf = vec![0x7f_u8; cap];
        let len = unsafe { se_android_get_language(buf.as_mut_ptr().cast(), cap) };
        (len, buf)
    }

    #[test]
    fn neutral_values_without_context() {
        let _turn = SLOT.lock().unwrap_or_else(|e| e.into_inner());
        uninstall();

        assert_eq!(se_android_get_event(), -1);
        assert_eq!(se_android_get_event(), -1);
        assert_eq!(se_android_get_visible_top(), 0.0);
        assert_eq!(se_android_get_visible_bottom(), 0.0);
        assert_eq!(se_android_get_dpi_scale(), 1.0);
        let (len, buf) = language(8);
        assert_eq!(len, 0);
        assert_eq!(buf[0], 0);
        assert_eq!(unsafe { se_android_get_language(std::ptr::null_mut(), 0) }, 0);

        se_android_show_keyboard();
        se_android_poll_keyboard();
        se_android_open_file();
    }

    #[test]
    fn getters_read_the_installed_context() {
        let _turn = SLOT.lock().unwrap_or_else(|e| e.into_inner());
        let bridge = FakeBridge::new();
        let ctx = Arc::new(ShimContext::new(ShimConfig::default(), Box::new(bridge.clone())));
        ctx.on_create();
        ctx.on_global_layout(VisibleRect { left: 0, top: 30, right: 720, bottom: 1280 });
        install(Arc::clone(&ctx));

        assert_eq!(se_android_get_visible_top(), 30.0);
        assert_eq!(se_android_get_visible_bottom(), 1280.0);
        assert_eq!(se_android_get_dpi_scale(), 2.0);

        let (len, buf) = language(16);
        assert_eq!(len, 5);
        assert_eq!(&buf[..6], b"fr_FR\0");

        let (len, buf) = language(3);
        assert_eq!(len, 5);
        assert_eq!(&buf, b"fr\0");

        bridge.field.type_text("a");
        se_android_poll_keyboard();
        assert_eq!(se_android_get_event(), -1);
        ctx.run_ui_tasks();
        assert_eq!(se_android_get_event(), BATCH_MARKER);
        assert_eq!(se_android_get_event(), KeyEvent::Char('a').code());
        assert_eq!(se_android_get_event(), -1);

        uninstall();
        assert_eq!(se_android_get_dpi_scale(), 1.0);
    }

    #[test]
    fn registered_core_follows_the_context() {
        let _turn = SLOT.lock().unwrap_or_else(|e| e.into_inner());
        uninstall();
        let core = Arc::new(RecordingCore::default());
        register_core(Some(core.clone()));

        let ctx = Arc::new(ShimContext::new(ShimConfig::default(), Box::new(FakeBridge::new())));
        install(Arc::clone(&ctx));
        assert!(ctx.native_core().is_some());

        se_android_register_core(None, None);
        assert!(ctx.native_core().is_none());

        uninstall();
    }
}
