// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for `com.sky.SkyEmu.EnhancedNativeActivity`.
//
// The activity forwards its lifecycle and view callbacks here, always on the
// UI thread:
//
// ```java
// private native void nativeOnCreate(String configJson);
// private native void nativeOnDestroy();
// private native void nativeOnGlobalLayout(int left, int top, int right, int bottom);
// private native void nativeOnConfigurationChanged();
// private native void nativeOnActivityResult(int requestCode, int resultCode, String uri);
// private native void nativeOnRequestPermissionsResult(int requestCode, int[] grantResults);
// private native void nativeOnSystemUiVisibilityChange(int visibility);
// private native int nativeRunUiTasks();
// ```

#![cfg(target_os = "android")]
#![allow(non_snake_case)]

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use jni::objects::{GlobalRef, JIntArray, JObject, JString};
use jni::sys::jint;
use jni::JNIEnv;

use skyemu_core::config::ShimConfig;
use skyemu_core::types::{DocumentLocator, VisibleRect};

use crate::context::ShimContext;
use crate::{ffi, logging};

/// Keeps the activity reference published through `ndk-context` alive.
static HOST_ACTIVITY: Mutex<Option<GlobalRef>> = Mutex::new(None);

/// Run a callback against the live context, swallowing panics.
fn with_context<T>(name: &str, neutral: T, f: impl FnOnce(&ShimContext) -> T) -> T {
    let Some(ctx) = ffi::current() else {
        tracing::warn!(call = name, "JNI callback without a shim context");
        return neutral;
    };
    catch_unwind(AssertUnwindSafe(|| f(&ctx))).unwrap_or_else(|_| {
        tracing::error!(call = name, "panic caught at the JNI boundary");
        neutral
    })
}

fn read_config(env: &mut JNIEnv, config_json: &JString) -> ShimConfig {
    if config_json.is_null() {
        return ShimConfig::default();
    }
    let text: String = match env.get_string(config_json) {
        Ok(s) => s.into(),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable shim config, using defaults");
            return ShimConfig::default();
        }
    };
    ShimConfig::from_json(&text).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid shim config, using defaults");
        ShimConfig::default()
    })
}

/// Publish the VM and activity through `ndk-context` for the bridge.
fn publish_android_context(env: &JNIEnv, activity: &JObject) -> jni::errors::Result<()> {
    let vm = env.get_java_vm()?;
    let global = env.new_global_ref(activity)?;

    let mut slot = HOST_ACTIVITY.lock().unwrap_or_else(|e| e.into_inner());
    if slot.is_some() {
        // SAFETY: a context was published by the previous create and never
        // released; it is released before being replaced.
        unsafe { ndk_context::release_android_context() };
    }
    // SAFETY: the VM pointer is process-wide and the activity is kept alive by
    // the global reference stored alongside it.
    unsafe {
        ndk_context::initialize_android_context(
            vm.get_java_vm_pointer().cast(),
            global.as_obj().as_raw().cast(),
        );
    }
    *slot = Some(global);
    Ok(())
}

/// `nativeOnCreate(String configJson)`; `configJson` may be null.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnCreate(
    mut env: JNIEnv,
    activity: JObject,
    config_json: JString,
) {
    let config = read_config(&mut env, &config_json);
    logging::init(&config);
    tracing::info!("nativeOnCreate");

    if let Err(e) = publish_android_context(&env, &activity) {
        tracing::error!(error = %e, "could not publish Android context");
        return;
    }

    let created = catch_unwind(AssertUnwindSafe(|| {
        let bridge = skyemu_bridge::platform_bridge()?;
        let ctx = Arc::new(ShimContext::new(config, bridge));
        ctx.on_create();
        ffi::install(ctx);
        Ok::<_, skyemu_core::ShimError>(())
    }));
    match created {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "shim context not created"),
        Err(_) => tracing::error!("panic while creating shim context"),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnDestroy(
    _env: JNIEnv,
    _activity: JObject,
) {
    tracing::info!("nativeOnDestroy");
    ffi::uninstall();

    let mut slot = HOST_ACTIVITY.lock().unwrap_or_else(|e| e.into_inner());
    if slot.take().is_some() {
        // SAFETY: paired with the initialisation in `nativeOnCreate`.
        unsafe { ndk_context::release_android_context() };
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnGlobalLayout(
    _env: JNIEnv,
    _activity: JObject,
    left: jint,
    top: jint,
    right: jint,
    bottom: jint,
) {
    with_context("nativeOnGlobalLayout", (), |ctx| {
        ctx.on_global_layout(VisibleRect { left, top, right, bottom })
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnConfigurationChanged(
    _env: JNIEnv,
    _activity: JObject,
) {
    with_context("nativeOnConfigurationChanged", (), ShimContext::on_configuration_changed);
}

/// `uri` is `data.getData().toString()`, or null when the picker returned
/// no data.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnActivityResult(
    mut env: JNIEnv,
    _activity: JObject,
    request_code: jint,
    result_code: jint,
    uri: JString,
) {
    let data = if uri.is_null() {
        None
    } else {
        match env.get_string(&uri) {
            Ok(s) => Some(DocumentLocator::new(String::from(s))),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable document URI");
                None
            }
        }
    };
    with_context("nativeOnActivityResult", (), |ctx| {
        let outcome = ctx.on_activity_result(request_code, result_code, data);
        tracing::debug!(?outcome, "activity result handled");
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnRequestPermissionsResult(
    env: JNIEnv,
    _activity: JObject,
    request_code: jint,
    grant_results: JIntArray,
) {
    let results = if grant_results.is_null() {
        Vec::new()
    } else {
        let len = env.get_array_length(&grant_results).unwrap_or(0).max(0) as usize;
        let mut buf = vec![0; len];
        if let Err(e) = env.get_int_array_region(&grant_results, 0, &mut buf) {
            tracing::warn!(error = %e, "unreadable permission results");
            buf.clear();
        }
        buf
    };
    with_context("nativeOnRequestPermissionsResult", (), |ctx| {
        ctx.on_permissions_result(request_code, &results);
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeOnSystemUiVisibilityChange(
    _env: JNIEnv,
    _activity: JObject,
    visibility: jint,
) {
    with_context("nativeOnSystemUiVisibilityChange", (), |ctx| {
        ctx.on_system_ui_visibility_change(visibility);
    });
}

/// Called by the activity on its UI thread every frame.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sky_SkyEmu_EnhancedNativeActivity_nativeRunUiTasks(
    _env: JNIEnv,
    _activity: JObject,
) -> jint {
    with_context("nativeRunUiTasks", 0, |ctx| ctx.run_ui_tasks() as jint)
}
