// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The shadow `EditText`, seen through JNI.

use std::sync::Arc;

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use skyemu_core::error::Result;
use skyemu_core::types::FieldSnapshot;

use super::{jni_err, opt_string, with_env};
use crate::field::{char_to_utf16_offset, utf16_to_char_offset};
use crate::traits::ShadowTextField;

/// Handle to the installed `EditText`. Android offsets are UTF-16 code
/// units and are converted at this boundary.
pub struct AndroidTextField {
    vm: Arc<JavaVM>,
    view: GlobalRef,
}

impl AndroidTextField {
    pub(crate) fn new(vm: Arc<JavaVM>, view: GlobalRef) -> Self {
        Self { vm, view }
    }
}

/// `view.getText().toString()`
fn current_text(env: &mut JNIEnv<'_>, view: &JObject<'_>) -> Result<String> {
    let editable: JObject = env
        .call_method(view, "getText", "()Landroid/text/Editable;", &[])
        .map_err(|e| jni_err("EditText.getText", e))?
        .l()
        .map_err(|e| jni_err("getText->l", e))?;
    if editable.is_null() {
        return Ok(String::new());
    }
    let text: JObject = env
        .call_method(&editable, "toString", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("Editable.toString", e))?
        .l()
        .map_err(|e| jni_err("Editable.toString->l", e))?;
    Ok(opt_string(env, text, "get_string(field)")?.unwrap_or_default())
}

fn set_selection(env: &mut JNIEnv<'_>, view: &JObject<'_>, utf16: usize) -> Result<()> {
    let index = i32::try_from(utf16).unwrap_or(i32::MAX);
    env.call_method(view, "setSelection", "(I)V", &[JValue::Int(index)])
        .map_err(|e| jni_err("EditText.setSelection", e))?;
    Ok(())
}

impl ShadowTextField for AndroidTextField {
    fn snapshot(&self) -> Result<FieldSnapshot> {
        with_env(&self.vm, |env| {
            let view = self.view.as_obj();
            let text = current_text(env, view)?;
            let end = env
                .call_method(view, "getSelectionEnd", "()I", &[])
                .map_err(|e| jni_err("EditText.getSelectionEnd", e))?
                .i()
                .map_err(|e| jni_err("getSelectionEnd->i", e))?;
            // -1 when the field has no selection yet.
            let cursor = match usize::try_from(end) {
                Ok(end) => utf16_to_char_offset(&text, end),
                Err(_) => text.chars().count(),
            };
            Ok(FieldSnapshot { text, cursor })
        })
    }

    fn reset(&mut self, text: &str, cursor: usize) -> Result<()> {
        with_env(&self.vm, |env| {
            let view = self.view.as_obj();
            let j_text: JString = env
                .new_string(text)
                .map_err(|e| jni_err("new_string(field)", e))?;
            env.call_method(view, "setText", "(Ljava/lang/CharSequence;)V", &[JValue::Object(&j_text)])
                .map_err(|e| jni_err("EditText.setText", e))?;
            let cursor = cursor.min(text.chars().count());
            set_selection(env, view, char_to_utf16_offset(text, cursor))
        })
    }

    fn set_cursor(&mut self, cursor: usize) -> Result<()> {
        with_env(&self.vm, |env| {
            let view = self.view.as_obj();
            let text = current_text(env, view)?;
            let cursor = cursor.min(text.chars().count());
            set_selection(env, view, char_to_utf16_offset(&text, cursor))
        })
    }
}
