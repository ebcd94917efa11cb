// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory shadow field and offset conversions shared by implementations.

use std::sync::{Arc, Mutex, MutexGuard};

use skyemu_core::error::Result;
use skyemu_core::types::FieldSnapshot;

use crate::traits::ShadowTextField;

/// Shadow field held in process memory.
///
/// Used where no platform view exists (desktop, tests). Clones share the same
/// buffer, so one handle can play the input method while another is owned by
/// the shim.
#[derive(Debug, Clone)]
pub struct MemoryTextField {
    inner: Arc<Mutex<FieldSnapshot>>,
}

impl MemoryTextField {
    /// A field at the sentinel baseline.
    pub fn new() -> Self {
        Self::with_snapshot(FieldSnapshot::baseline())
    }

    pub fn with_snapshot(snapshot: FieldSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FieldSnapshot> {
        // A poisoned lock still holds a consistent snapshot.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state, for inspection.
    pub fn current(&self) -> FieldSnapshot {
        self.lock().clone()
    }

    /// Insert text at the cursor, as an input method commit would.
    pub fn type_text(&self, text: &str) {
        let mut field = self.lock();
        let at = byte_index(&field.text, field.cursor);
        field.text.insert_str(at, text);
        field.cursor += text.chars().count();
    }

    /// Delete up to `count` characters before the cursor.
    pub fn delete_backward(&self, count: usize) {
        let mut field = self.lock();
        let count = count.min(field.cursor);
        let start = byte_index(&field.text, field.cursor - count);
        let end = byte_index(&field.text, field.cursor);
        field.text.replace_range(start..end, "");
        field.cursor -= count;
    }

    /// Delete up to `count` characters after the cursor.
    pub fn delete_forward(&self, count: usize) {
        let mut field = self.lock();
        let len = field.text.chars().count();
        let end_chars = (field.cursor + count).min(len);
        let start = byte_index(&field.text, field.cursor);
        let end = byte_index(&field.text, end_chars);
        field.text.replace_range(start..end, "");
    }

    /// Move the cursor by `delta`, clamped to the text.
    pub fn move_cursor(&self, delta: isize) {
        let mut field = self.lock();
        let len = field.text.chars().count();
        field.cursor = field.cursor.saturating_add_signed(delta).min(len);
    }
}

impl Default for MemoryTextField {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowTextField for MemoryTextField {
    fn snapshot(&self) -> Result<FieldSnapshot> {
        Ok(self.current())
    }

    fn reset(&mut self, text: &str, cursor: usize) -> Result<()> {
        let mut field = self.lock();
        field.text = text.to_owned();
        field.cursor = cursor.min(text.chars().count());
        Ok(())
    }

    fn set_cursor(&mut self, cursor: usize) -> Result<()> {
        let mut field = self.lock();
        field.cursor = cursor.min(field.text.chars().count());
        Ok(())
    }
}

/// Byte index of the `chars`-th scalar value (or the end of the string).
fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

/// Convert a UTF-16 code unit offset (as used by Android text APIs) to a
/// scalar value offset. An offset inside a surrogate pair rounds down.
pub fn utf16_to_char_offset(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        units += c.len_utf16();
        if units > utf16 {
            return i;
        }
    }
    text.chars().count()
}

/// Convert a scalar value offset to a UTF-16 code unit offset.
pub fn char_to_utf16_offset(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_baseline() {
        assert!(MemoryTextField::new().current().is_baseline());
    }

    #[test]
    fn typing_advances_cursor() {
        let field = MemoryTextField::new();
        field.type_text("hé");
        let snap = field.current();
        assert_eq!(snap.cursor, 10);
        assert_eq!(snap.text.chars().count(), 18);
        assert_eq!(snap.text.chars().nth(8), Some('h'));
        assert_eq!(snap.text.chars().nth(9), Some('é'));
    }

    #[test]
    fn deleting_backward_clamps_at_start() {
        let field = MemoryTextField::new();
        field.delete_backward(20);
        let snap = field.current();
        assert_eq!(snap.cursor, 0);
        assert_eq!(snap.text.chars().count(), 8);
    }

    #[test]
    fn deleting_forward_keeps_cursor() {
        let field = MemoryTextField::new();
        field.delete_forward(3);
        let snap = field.current();
        assert_eq!(snap.cursor, 8);
        assert_eq!(snap.text.chars().count(), 13);
    }

    #[test]
    fn clones_share_the_buffer() {
        let field = MemoryTextField::new();
        let mut owned = field.clone();
        field.type_text("x");
        owned.reset("abc", 1).expect("reset");
        assert_eq!(field.current(), FieldSnapshot { text: "abc".into(), cursor: 1 });
    }

    #[test]
    fn cursor_moves_clamp() {
        let field = MemoryTextField::new();
        field.move_cursor(-100);
        assert_eq!(field.current().cursor, 0);
        field.move_cursor(100);
        assert_eq!(field.current().cursor, 16);
    }

    #[test]
    fn utf16_offsets_round_trip_outside_bmp() {
        let text = "a🎮b";
        assert_eq!(char_to_utf16_offset(text, 2), 3);
        assert_eq!(utf16_to_char_offset(text, 3), 2);
        // Offset 2 falls between the surrogates of the emoji.
        assert_eq!(utf16_to_char_offset(text, 2), 1);
        assert_eq!(utf16_to_char_offset(text, 99), 3);
    }
}
