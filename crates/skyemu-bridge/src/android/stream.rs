// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `java.io.InputStream` exposed as `std::io::Read`.

use std::io;
use std::sync::Arc;

use jni::objects::{GlobalRef, JValue};
use jni::JavaVM;

use skyemu_core::error::ShimError;

use super::with_env;

/// Largest chunk pulled across JNI per `read` call.
const MAX_CHUNK: usize = 64 * 1024;

/// Owns a global reference to an open Java stream and closes it on drop.
pub struct JavaInputStream {
    vm: Arc<JavaVM>,
    stream: GlobalRef,
}

impl JavaInputStream {
    pub(crate) fn new(vm: Arc<JavaVM>, stream: GlobalRef) -> Self {
        Self { vm, stream }
    }
}

impl io::Read for JavaInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(MAX_CHUNK) as i32;
        let stream = self.stream.as_obj();

        let chunk = with_env(&self.vm, |env| {
            env.with_local_frame(4, |env| -> jni::errors::Result<Vec<u8>> {
                let array = env.new_byte_array(want)?;
                let n = env
                    .call_method(stream, "read", "([B)I", &[JValue::Object(&array)])?
                    .i()?;
                if n <= 0 {
                    return Ok(Vec::new());
                }
                let mut bytes = env.convert_byte_array(&array)?;
                bytes.truncate(n as usize);
                Ok(bytes)
            })
            .map_err(|e| ShimError::Bridge(format!("InputStream.read: {e}")))
        })
        .map_err(|e| io::Error::other(e.to_string()))?;

        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}

impl Drop for JavaInputStream {
    fn drop(&mut self) {
        let stream = self.stream.as_obj();
        let closed = with_env(&self.vm, |env| {
            env.call_method(stream, "close", "()V", &[])
                .map_err(|e| ShimError::Bridge(format!("InputStream.close: {e}")))?;
            Ok(())
        });
        if let Err(e) = closed {
            tracing::warn!(error = %e, "Android: failed to close document stream");
        }
    }
}
