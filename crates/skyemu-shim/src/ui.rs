// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// UI task dispatch.
//
// The native core runs on its own thread, but views may only be touched on
// the UI thread. Requests travel over a channel and are drained, in order,
// when the host activity calls `run_pending` from its UI thread.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use skyemu_core::error::{Result, ShimError};

/// Work that must run on the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    ShowKeyboard,
    HideKeyboard,
    PollKeyboard,
    OpenDocument,
    ReapplyImmersive,
}

#[derive(Debug)]
struct UiTask {
    command: UiCommand,
    done: oneshot::Sender<Result<()>>,
}

/// Resolves once the UI thread has run the command.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Result<()>>,
}

impl Completion {
    /// Wait for the outcome. `TaskDropped` if the dispatcher went away first.
    pub async fn wait(self) -> Result<()> {
        self.rx.await.map_err(|_| ShimError::TaskDropped)?
    }

    /// Block the calling thread until the outcome is known. Must not be
    /// called on the UI thread.
    pub fn wait_blocking(self) -> Result<()> {
        self.rx.blocking_recv().map_err(|_| ShimError::TaskDropped)?
    }

    /// The outcome if already known.
    pub fn try_result(&mut self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(ShimError::TaskDropped)),
        }
    }
}

/// FIFO of UI tasks.
#[derive(Debug)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiTask>,
    rx: Mutex<mpsc::UnboundedReceiver<UiTask>>,
}

impl UiDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    fn receiver(&self) -> MutexGuard<'_, mpsc::UnboundedReceiver<UiTask>> {
        self.rx.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a command from any thread.
    pub fn dispatch(&self, command: UiCommand) -> Completion {
        let (done, rx) = oneshot::channel();
        if self.tx.send(UiTask { command, done }).is_err() {
            // The receiver lives as long as `self`; the task is dropped here
            // and the completion reports `TaskDropped`.
            warn!(?command, "UI task queue closed");
        }
        Completion { rx }
    }

    /// Run every queued command on the calling (UI) thread, in order.
    /// Returns how many ran.
    pub fn run_pending(&self, mut run: impl FnMut(UiCommand) -> Result<()>) -> usize {
        let mut rx = self.receiver();
        let mut count = 0;
        while let Ok(task) = rx.try_recv() {
            let result = run(task.command);
            if let Err(e) = &result {
                warn!(command = ?task.command, error = %e, "UI task failed");
            }
            // The caller may have dropped its completion.
            let _ = task.done.send(result);
            count += 1;
        }
        if count > 0 {
            debug!(count, "UI tasks run");
        }
        count
    }
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
