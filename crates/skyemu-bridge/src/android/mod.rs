// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Targets `aarch64-linux-android` / `armv7-linux-androideabi`. Each trait
// method drives the Android SDK through JNI calls into the ART runtime.
//
// ## Architecture notes
//
// The `JavaVM` and hosting activity come from `ndk-context`, which the shim
// initialises from the activity's `onCreate`. View methods (shadow field,
// keyboard, system UI flags) must run on the UI thread; the shim guarantees
// that by routing them through its UI task queue.
//
// Any Java exception left pending by a failed call is described to logcat
// and cleared before the error is returned, so it never propagates back into
// the host activity.

#![cfg(target_os = "android")]

mod field;
mod stream;

use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use skyemu_core::error::{Result, ShimError};
use skyemu_core::types::{
    shadow_baseline, DisplayMetrics, DocumentLocator, FLAG_ALT_FOCUSABLE_IM, SHADOW_PAD,
};

use crate::traits::*;

pub use field::AndroidTextField;
pub use stream::JavaInputStream;

// ---------------------------------------------------------------------------
// Android constants
// ---------------------------------------------------------------------------

/// `ViewGroup.LayoutParams.WRAP_CONTENT`
const WRAP_CONTENT: i32 = -2;

/// `InputType.TYPE_CLASS_TEXT`
const TYPE_CLASS_TEXT: i32 = 0x0000_0001;

/// `EditorInfo.IME_FLAG_NO_EXTRACT_UI`
const IME_FLAG_NO_EXTRACT_UI: i32 = 0x1000_0000;

/// `android.R.id.content`
const CONTENT_VIEW_ID: i32 = 0x0102_0002;

/// `InputMethodManager.SHOW_IMPLICIT`
const SHOW_IMPLICIT: i32 = 0x0001;

/// `InputMethodManager.HIDE_IMPLICIT_ONLY`
const HIDE_IMPLICIT_ONLY: i32 = 0x0001;

/// READ | WRITE | PERSISTABLE | PREFIX URI permission grants.
const PICKER_GRANT_FLAGS: i32 = 0x0000_0001 | 0x0000_0002 | 0x0000_0040 | 0x0000_0080;

/// `OpenableColumns.DISPLAY_NAME`
const DISPLAY_NAME_COLUMN: &str = "_display_name";

// ---------------------------------------------------------------------------
// JNI helpers
// ---------------------------------------------------------------------------

/// Map any `jni::errors::Error` into `ShimError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> ShimError {
    ShimError::Bridge(format!("{context}: {e}"))
}

/// Run `f` with the current thread attached to the VM.
///
/// If `f` fails with a Java exception pending, the exception is logged by
/// the VM and cleared.
pub(crate) fn with_env<T>(vm: &JavaVM, f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>) -> Result<T> {
    let mut guard = vm
        .attach_current_thread()
        .map_err(|e| jni_err("attach_current_thread", e))?;
    let result = f(&mut *guard);
    if result.is_err() && guard.exception_check().unwrap_or(false) {
        let _ = guard.exception_describe();
        let _ = guard.exception_clear();
    }
    result
}

/// Read a nullable `java.lang.String` object into a Rust string.
fn opt_string(env: &mut JNIEnv<'_>, obj: JObject<'_>, context: &str) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let s: String = env
        .get_string(&JString::from(obj))
        .map_err(|e| jni_err(context, e))?
        .into();
    Ok(Some(s))
}

/// `Uri.parse(locator)`
fn parse_uri<'a>(env: &mut JNIEnv<'a>, document: &DocumentLocator) -> Result<JObject<'a>> {
    let j_uri: JString = env
        .new_string(document.as_str())
        .map_err(|e| jni_err("new_string(uri)", e))?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri)],
    )
    .map_err(|e| jni_err("Uri.parse", e))?
    .l()
    .map_err(|e| jni_err("Uri.parse->l", e))
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the shim's platform bridge.
pub struct AndroidBridge {
    vm: Arc<JavaVM>,
    activity: GlobalRef,
    /// The shadow `EditText`, once installed.
    shadow_view: OnceLock<GlobalRef>,
}

impl AndroidBridge {
    /// Create a bridge for the activity published through `ndk-context`.
    pub fn new() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: `ctx.vm()` is the `JavaVM*` registered by the shim's
        // `onCreate` hook and stays valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| ShimError::Bridge(format!("failed to obtain JavaVM: {e}")))?;

        let ptr = ctx.context();
        if ptr.is_null() {
            return Err(ShimError::Bridge(
                "Android context is null, activity not initialised".into(),
            ));
        }

        let activity = with_env(&vm, |env| {
            // SAFETY: the context pointer is a live global reference to the
            // hosting activity.
            let local = unsafe { JObject::from_raw(ptr.cast()) };
            env.new_global_ref(&local)
                .map_err(|e| jni_err("new_global_ref(activity)", e))
        })?;

        Ok(Self {
            vm: Arc::new(vm),
            activity,
            shadow_view: OnceLock::new(),
        })
    }

    fn with_env<T>(&self, f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'static>) -> Result<T>) -> Result<T> {
        let activity = self.activity.as_obj();
        with_env(&self.vm, |env| f(env, activity))
    }

    fn shadow_view(&self) -> Result<&GlobalRef> {
        self.shadow_view
            .get()
            .ok_or_else(|| ShimError::Bridge("shadow field not installed".into()))
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

/// `activity.getWindow()`
fn window<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    env.call_method(activity, "getWindow", "()Landroid/view/Window;", &[])
        .map_err(|e| jni_err("getWindow", e))?
        .l()
        .map_err(|e| jni_err("getWindow->l", e))
}

/// `window.getDecorView()`
fn decor_view<'a>(env: &mut JNIEnv<'a>, window: &JObject<'_>) -> Result<JObject<'a>> {
    env.call_method(window, "getDecorView", "()Landroid/view/View;", &[])
        .map_err(|e| jni_err("getDecorView", e))?
        .l()
        .map_err(|e| jni_err("getDecorView->l", e))
}

/// `activity.getSystemService(Context.INPUT_METHOD_SERVICE)`
fn input_method_manager<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    let j_service: JString = env
        .new_string("input_method")
        .map_err(|e| jni_err("new_string(input_method)", e))?;
    env.call_method(
        activity,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&j_service)],
    )
    .map_err(|e| jni_err("getSystemService", e))?
    .l()
    .map_err(|e| jni_err("getSystemService->l", e))
}

// ---------------------------------------------------------------------------
// NativeKeyboard: invisible EditText + InputMethodManager
// ---------------------------------------------------------------------------

impl NativeKeyboard for AndroidBridge {
    /// Add a wrap-content `EditText` to the content `FrameLayout`, configure it
    /// for plain text without the full-screen extract UI, seed the sentinel
    /// baseline and set `FLAG_ALT_FOCUSABLE_IM` so the keyboard stays hidden
    /// until requested.
    fn install_shadow_field(&self) -> Result<Box<dyn ShadowTextField>> {
        let view = self.with_env(|env, activity| {
            let edit_text: JObject = env
                .new_object(
                    "android/widget/EditText",
                    "(Landroid/content/Context;)V",
                    &[JValue::Object(activity)],
                )
                .map_err(|e| jni_err("new EditText", e))?;

            let params: JObject = env
                .new_object(
                    "android/widget/FrameLayout$LayoutParams",
                    "(II)V",
                    &[JValue::Int(WRAP_CONTENT), JValue::Int(WRAP_CONTENT)],
                )
                .map_err(|e| jni_err("new FrameLayout.LayoutParams", e))?;

            env.call_method(
                &edit_text,
                "setLayoutParams",
                "(Landroid/view/ViewGroup$LayoutParams;)V",
                &[JValue::Object(&params)],
            )
            .map_err(|e| jni_err("setLayoutParams", e))?;

            env.call_method(&edit_text, "setRawInputType", "(I)V", &[JValue::Int(TYPE_CLASS_TEXT)])
                .map_err(|e| jni_err("setRawInputType", e))?;

            env.call_method(&edit_text, "setImeOptions", "(I)V", &[JValue::Int(IME_FLAG_NO_EXTRACT_UI)])
                .map_err(|e| jni_err("setImeOptions", e))?;

            let window = window(env, activity)?;
            env.call_method(
                &window,
                "setFlags",
                "(II)V",
                &[JValue::Int(FLAG_ALT_FOCUSABLE_IM), JValue::Int(FLAG_ALT_FOCUSABLE_IM)],
            )
            .map_err(|e| jni_err("Window.setFlags", e))?;

            let decor = decor_view(env, &window)?;
            let content: JObject = env
                .call_method(&decor, "findViewById", "(I)Landroid/view/View;", &[JValue::Int(CONTENT_VIEW_ID)])
                .map_err(|e| jni_err("findViewById(content)", e))?
                .l()
                .map_err(|e| jni_err("findViewById->l", e))?;
            if content.is_null() {
                return Err(ShimError::Bridge("content view not found".into()));
            }

            env.call_method(&content, "addView", "(Landroid/view/View;)V", &[JValue::Object(&edit_text)])
                .map_err(|e| jni_err("addView(EditText)", e))?;

            env.new_global_ref(&edit_text)
                .map_err(|e| jni_err("new_global_ref(EditText)", e))
        })?;

        let mut field = AndroidTextField::new(Arc::clone(&self.vm), view.clone());
        field.reset(&shadow_baseline(), SHADOW_PAD)?;

        if self.shadow_view.set(view).is_err() {
            tracing::warn!("Android: shadow field installed twice; keeping the first");
        }
        tracing::info!("Android: shadow field installed");
        Ok(Box::new(field))
    }

    fn show_soft_keyboard(&self) -> Result<()> {
        let view = self.shadow_view()?;
        self.with_env(|env, activity| {
            let window = window(env, activity)?;
            env.call_method(&window, "clearFlags", "(I)V", &[JValue::Int(FLAG_ALT_FOCUSABLE_IM)])
                .map_err(|e| jni_err("Window.clearFlags", e))?;

            env.call_method(view.as_obj(), "requestFocus", "()Z", &[])
                .map_err(|e| jni_err("requestFocus", e))?;

            let imm = input_method_manager(env, activity)?;
            env.call_method(
                &imm,
                "showSoftInput",
                "(Landroid/view/View;I)Z",
                &[JValue::Object(view.as_obj()), JValue::Int(SHOW_IMPLICIT)],
            )
            .map_err(|e| jni_err("showSoftInput", e))?;

            tracing::debug!("Android: soft keyboard shown");
            Ok(())
        })
    }

    fn hide_soft_keyboard(&self) -> Result<()> {
        self.with_env(|env, activity| {
            let window = window(env, activity)?;
            env.call_method(
                &window,
                "setFlags",
                "(II)V",
                &[JValue::Int(FLAG_ALT_FOCUSABLE_IM), JValue::Int(FLAG_ALT_FOCUSABLE_IM)],
            )
            .map_err(|e| jni_err("Window.setFlags", e))?;

            let decor = decor_view(env, &window)?;
            let token: JObject = env
                .call_method(&decor, "getWindowToken", "()Landroid/os/IBinder;", &[])
                .map_err(|e| jni_err("getWindowToken", e))?
                .l()
                .map_err(|e| jni_err("getWindowToken->l", e))?;

            let imm = input_method_manager(env, activity)?;
            env.call_method(
                &imm,
                "hideSoftInputFromWindow",
                "(Landroid/os/IBinder;I)Z",
                &[JValue::Object(&token), JValue::Int(HIDE_IMPLICIT_ONLY)],
            )
            .map_err(|e| jni_err("hideSoftInputFromWindow", e))?;

            tracing::debug!("Android: soft keyboard hidden");
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// NativeDisplay: DisplayMetrics, Locale, Build.VERSION
// ---------------------------------------------------------------------------

impl NativeDisplay for AndroidBridge {
    /// `getWindowManager().getDefaultDisplay().getRealMetrics(metrics)`
    fn display_metrics(&self) -> Result<DisplayMetrics> {
        self.with_env(|env, activity| {
            let metrics: JObject = env
                .new_object("android/util/DisplayMetrics", "()V", &[])
                .map_err(|e| jni_err("new DisplayMetrics", e))?;

            let wm: JObject = env
                .call_method(activity, "getWindowManager", "()Landroid/view/WindowManager;", &[])
                .map_err(|e| jni_err("getWindowManager", e))?
                .l()
                .map_err(|e| jni_err("getWindowManager->l", e))?;

            let display: JObject = env
                .call_method(&wm, "getDefaultDisplay", "()Landroid/view/Display;", &[])
                .map_err(|e| jni_err("getDefaultDisplay", e))?
                .l()
                .map_err(|e| jni_err("getDefaultDisplay->l", e))?;

            env.call_method(
                &display,
                "getRealMetrics",
                "(Landroid/util/DisplayMetrics;)V",
                &[JValue::Object(&metrics)],
            )
            .map_err(|e| jni_err("getRealMetrics", e))?;

            let mut float_field = |name: &str| -> Result<f32> {
                env.get_field(&metrics, name, "F")
                    .map_err(|e| jni_err(name, e))?
                    .f()
                    .map_err(|e| jni_err(name, e))
            };
            let xdpi = float_field("xdpi")?;
            let ydpi = float_field("ydpi")?;

            let mut int_field = |name: &str| -> Result<i32> {
                env.get_field(&metrics, name, "I")
                    .map_err(|e| jni_err(name, e))?
                    .i()
                    .map_err(|e| jni_err(name, e))
            };
            let width_px = int_field("widthPixels")?;
            let height_px = int_field("heightPixels")?;

            Ok(DisplayMetrics {
                xdpi,
                ydpi,
                width_px,
                height_px,
            })
        })
    }

    /// `Locale.getDefault().toString()`
    fn locale_tag(&self) -> Result<String> {
        self.with_env(|env, _| {
            let locale: JObject = env
                .call_static_method("java/util/Locale", "getDefault", "()Ljava/util/Locale;", &[])
                .map_err(|e| jni_err("Locale.getDefault", e))?
                .l()
                .map_err(|e| jni_err("Locale.getDefault->l", e))?;

            let tag: JObject = env
                .call_method(&locale, "toString", "()Ljava/lang/String;", &[])
                .map_err(|e| jni_err("Locale.toString", e))?
                .l()
                .map_err(|e| jni_err("Locale.toString->l", e))?;

            Ok(opt_string(env, tag, "get_string(locale)")?.unwrap_or_default())
        })
    }

    fn api_level(&self) -> Result<i32> {
        self.with_env(|env, _| {
            env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
                .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
                .i()
                .map_err(|e| jni_err("SDK_INT->i", e))
        })
    }
}

// ---------------------------------------------------------------------------
// NativeDocumentPicker: Storage Access Framework
// ---------------------------------------------------------------------------

impl NativeDocumentPicker for AndroidBridge {
    /// Dispatch `ACTION_OPEN_DOCUMENT` for any MIME type. The chosen URI
    /// arrives through `onActivityResult` with `request_code`.
    fn launch_document_picker(&self, request_code: i32) -> Result<()> {
        self.with_env(|env, activity| {
            let j_action: JString = env
                .new_string("android.intent.action.OPEN_DOCUMENT")
                .map_err(|e| jni_err("new_string(ACTION_OPEN_DOCUMENT)", e))?;

            let intent: JObject = env
                .new_object("android/content/Intent", "(Ljava/lang/String;)V", &[JValue::Object(&j_action)])
                .map_err(|e| jni_err("new Intent(OPEN_DOCUMENT)", e))?;

            let j_type: JString = env
                .new_string("*/*")
                .map_err(|e| jni_err("new_string(*/*)", e))?;
            env.call_method(
                &intent,
                "setType",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_type)],
            )
            .map_err(|e| jni_err("setType", e))?;

            env.call_method(
                &intent,
                "addFlags",
                "(I)Landroid/content/Intent;",
                &[JValue::Int(PICKER_GRANT_FLAGS)],
            )
            .map_err(|e| jni_err("addFlags", e))?;

            env.call_method(
                activity,
                "startActivityForResult",
                "(Landroid/content/Intent;I)V",
                &[JValue::Object(&intent), JValue::Int(request_code)],
            )
            .map_err(|e| jni_err("startActivityForResult(OPEN_DOCUMENT)", e))?;

            tracing::info!(request_code, "Android: document picker dispatched");
            Ok(())
        })
    }

    /// Query the provider's `_display_name` column for the URI.
    fn query_display_name(&self, document: &DocumentLocator) -> Result<Option<String>> {
        self.with_env(|env, activity| {
            let uri = parse_uri(env, document)?;
            let resolver: JObject = env
                .call_method(activity, "getContentResolver", "()Landroid/content/ContentResolver;", &[])
                .map_err(|e| jni_err("getContentResolver", e))?
                .l()
                .map_err(|e| jni_err("getContentResolver->l", e))?;

            let null = JObject::null();
            let cursor: JObject = env
                .call_method(
                    &resolver,
                    "query",
                    "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                    &[
                        JValue::Object(&uri),
                        JValue::Object(&null),
                        JValue::Object(&null),
                        JValue::Object(&null),
                        JValue::Object(&null),
                    ],
                )
                .map_err(|e| jni_err("ContentResolver.query", e))?
                .l()
                .map_err(|e| jni_err("ContentResolver.query->l", e))?;

            if cursor.is_null() {
                return Ok(None);
            }

            let name = read_display_name(env, &cursor);
            let closed = env
                .call_method(&cursor, "close", "()V", &[])
                .map_err(|e| jni_err("Cursor.close", e));
            let name = name?;
            closed?;
            Ok(name)
        })
    }

    /// `ContentResolver.openInputStream(uri)`, wrapped as a `Read`.
    fn open_document(&self, document: &DocumentLocator) -> Result<Box<dyn Read + Send>> {
        let stream = self.with_env(|env, activity| {
            let uri = parse_uri(env, document)?;
            let resolver: JObject = env
                .call_method(activity, "getContentResolver", "()Landroid/content/ContentResolver;", &[])
                .map_err(|e| jni_err("getContentResolver", e))?
                .l()
                .map_err(|e| jni_err("getContentResolver->l", e))?;

            let input: JObject = env
                .call_method(
                    &resolver,
                    "openInputStream",
                    "(Landroid/net/Uri;)Ljava/io/InputStream;",
                    &[JValue::Object(&uri)],
                )
                .map_err(|e| jni_err("openInputStream", e))?
                .l()
                .map_err(|e| jni_err("openInputStream->l", e))?;

            if input.is_null() {
                return Err(ShimError::DocumentUnavailable(format!(
                    "ContentResolver returned null InputStream for {document}"
                )));
            }

            env.new_global_ref(&input)
                .map_err(|e| jni_err("new_global_ref(InputStream)", e))
        })?;

        tracing::debug!(uri = %document, "Android: document stream opened");
        Ok(Box::new(JavaInputStream::new(Arc::clone(&self.vm), stream)))
    }

    /// `getExternalFilesDir(null).getAbsolutePath()`
    fn external_files_dir(&self) -> Result<PathBuf> {
        self.with_env(|env, activity| {
            let null = JObject::null();
            let dir: JObject = env
                .call_method(
                    activity,
                    "getExternalFilesDir",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&null)],
                )
                .map_err(|e| jni_err("getExternalFilesDir", e))?
                .l()
                .map_err(|e| jni_err("getExternalFilesDir->l", e))?;

            if dir.is_null() {
                return Err(ShimError::Bridge("external storage is not mounted".into()));
            }

            let path: JObject = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
                .map_err(|e| jni_err("getAbsolutePath", e))?
                .l()
                .map_err(|e| jni_err("getAbsolutePath->l", e))?;

            opt_string(env, path, "get_string(externalFilesDir)")?
                .map(PathBuf::from)
                .ok_or_else(|| ShimError::Bridge("external files dir has no path".into()))
        })
    }
}

/// Move to the first row and read the display-name column, if present.
fn read_display_name(env: &mut JNIEnv<'_>, cursor: &JObject<'_>) -> Result<Option<String>> {
    let has_row = env
        .call_method(cursor, "moveToFirst", "()Z", &[])
        .map_err(|e| jni_err("Cursor.moveToFirst", e))?
        .z()
        .map_err(|e| jni_err("moveToFirst->z", e))?;
    if !has_row {
        return Ok(None);
    }

    let j_column: JString = env
        .new_string(DISPLAY_NAME_COLUMN)
        .map_err(|e| jni_err("new_string(_display_name)", e))?;
    let index = env
        .call_method(cursor, "getColumnIndex", "(Ljava/lang/String;)I", &[JValue::Object(&j_column)])
        .map_err(|e| jni_err("Cursor.getColumnIndex", e))?
        .i()
        .map_err(|e| jni_err("getColumnIndex->i", e))?;
    if index < 0 {
        return Ok(None);
    }

    let value: JObject = env
        .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(index)])
        .map_err(|e| jni_err("Cursor.getString", e))?
        .l()
        .map_err(|e| jni_err("Cursor.getString->l", e))?;
    opt_string(env, value, "get_string(display_name)")
}

// ---------------------------------------------------------------------------
// NativeWindowChrome: decor view system UI flags
// ---------------------------------------------------------------------------

impl NativeWindowChrome for AndroidBridge {
    fn set_system_ui_visibility(&self, flags: i32) -> Result<()> {
        self.with_env(|env, activity| {
            let window = window(env, activity)?;
            let decor = decor_view(env, &window)?;
            env.call_method(&decor, "setSystemUiVisibility", "(I)V", &[JValue::Int(flags)])
                .map_err(|e| jni_err("setSystemUiVisibility", e))?;
            tracing::debug!(flags = format_args!("{flags:#x}"), "Android: system UI visibility set");
            Ok(())
        })
    }
}
