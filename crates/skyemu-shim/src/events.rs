// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded FIFO of key-event codes, filled on the UI thread by keyboard polls
// and drained one code at a time by the native core.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use skyemu_core::config::ShimConfig;
use skyemu_core::error::{Result, ShimError};
use skyemu_core::types::{KeyEvent, BATCH_MARKER, NO_EVENT};

/// Key-event queue shared between the UI thread and the native core.
#[derive(Debug)]
pub struct KeyEventQueue {
    codes: Mutex<VecDeque<i32>>,
    capacity: usize,
    coalesce_markers: bool,
    /// Events rejected because the queue was full.
    dropped: AtomicU64,
}

impl KeyEventQueue {
    pub fn new(capacity: usize, coalesce_markers: bool) -> Self {
        Self {
            codes: Mutex::new(VecDeque::with_capacity(capacity.min(256))),
            capacity,
            coalesce_markers,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &ShimConfig) -> Self {
        Self::new(config.event_queue_capacity, config.coalesce_batch_markers)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<i32>> {
        self.codes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append an event.
    ///
    /// A batch marker is skipped (successfully) when the newest queued code
    /// is already a marker and coalescing is enabled.
    pub fn push(&self, event: KeyEvent) -> Result<()> {
        let mut codes = self.lock();
        if event.is_marker() && self.coalesce_markers && codes.back() == Some(&BATCH_MARKER) {
            return Ok(());
        }
        if codes.len() >= self.capacity {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                code = event.code(),
                capacity = self.capacity,
                dropped,
                "key event queue full, event dropped"
            );
            return Err(ShimError::EventQueueFull {
                capacity: self.capacity,
            });
        }
        codes.push_back(event.code());
        Ok(())
    }

    /// Oldest raw code, or `NO_EVENT` when empty. Never blocks.
    pub fn pop(&self) -> i32 {
        self.lock().pop_front().unwrap_or(NO_EVENT)
    }

    /// Oldest key event, skipping batch markers.
    pub fn next_key(&self) -> Option<KeyEvent> {
        let mut codes = self.lock();
        while let Some(code) = codes.pop_front() {
            match KeyEvent::from_code(code) {
                Some(KeyEvent::BatchMarker) | None => continue,
                Some(event) => return Some(event),
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events rejected since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
