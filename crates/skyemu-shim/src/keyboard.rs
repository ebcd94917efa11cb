// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Soft-keyboard diffing.
//
// The input method edits an invisible field seeded with sentinels on both
// sides of the cursor. Each poll compares the field with that baseline,
// turns the difference into key events and restores the baseline, so the
// next poll again sees only what changed since this one.

use tracing::debug;

use skyemu_bridge::traits::ShadowTextField;
use skyemu_core::error::Result;
use skyemu_core::types::{shadow_baseline, FieldSnapshot, KeyEvent, LEFT_PAD, RIGHT_PAD, SHADOW_PAD};

use crate::events::KeyEventQueue;

/// Key events implied by a field snapshot, in emission order: cursor
/// movement, then deletions, then inserted characters.
///
/// Cursor drift is measured against `len - 8`, where the cursor sits when
/// the right padding is intact. Every left sentinel that is gone stands for
/// one Backspace. Sentinels are never reported as characters.
pub fn diff_field(snapshot: &FieldSnapshot) -> Vec<KeyEvent> {
    let chars: Vec<char> = snapshot.text.chars().collect();
    let n = chars.len();
    let expected = n.saturating_sub(SHADOW_PAD);
    let cursor = snapshot.cursor.min(n);

    let mut events = Vec::new();

    if cursor < expected {
        events.extend(std::iter::repeat_n(KeyEvent::Left, expected - cursor));
    } else if cursor > expected {
        events.extend(std::iter::repeat_n(KeyEvent::Right, cursor - expected));
    }

    let left_kept = chars.iter().filter(|&&c| c == LEFT_PAD).count().min(SHADOW_PAD);
    events.extend(std::iter::repeat_n(KeyEvent::Backspace, SHADOW_PAD - left_kept));

    events.extend(
        chars
            .iter()
            .filter(|&&c| c != LEFT_PAD && c != RIGHT_PAD)
            .map(|&c| match c {
                '\n' => KeyEvent::Enter,
                c => KeyEvent::Char(c),
            }),
    );

    events
}

/// What one poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollReport {
    /// Events accepted by the queue, excluding the batch marker.
    pub emitted: usize,
    /// Events rejected because the queue was full.
    pub dropped: usize,
    /// Whether the field was brought back to the baseline, either rewritten
    /// or, when only the cursor drifted, by moving the cursor.
    pub reset: bool,
}

/// Run one poll: queue a batch marker, queue the diff of the field, and
/// restore the field to its baseline when anything changed. A field whose
/// text is intact only gets its cursor put back.
///
/// Must run on the UI thread.
pub fn poll_keyboard(field: &mut dyn ShadowTextField, queue: &KeyEventQueue) -> Result<PollReport> {
    let snapshot = field.snapshot()?;
    let mut report = PollReport::default();

    // A full queue is already logged and counted by the queue itself.
    let _ = queue.push(KeyEvent::BatchMarker);

    let events = diff_field(&snapshot);
    for event in &events {
        match queue.push(*event) {
            Ok(()) => report.emitted += 1,
            Err(_) => report.dropped += 1,
        }
    }

    let baseline = shadow_baseline();
    if snapshot.text != baseline {
        field.reset(&baseline, SHADOW_PAD)?;
        report.reset = true;
    } else if snapshot.cursor != SHADOW_PAD {
        field.set_cursor(SHADOW_PAD)?;
        report.reset = true;
    }

    if !events.is_empty() {
        debug!(
            emitted = report.emitted,
            dropped = report.dropped,
            "keyboard poll produced events"
        );
    }
    Ok(report)
}
