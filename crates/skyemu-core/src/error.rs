// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the SkyEmu shim.

use thiserror::Error;

/// Top-level error type for all shim operations.
#[derive(Debug, Error)]
pub enum ShimError {
    // -- Keyboard input --
    #[error("key event queue full ({capacity} events pending)")]
    EventQueueFull { capacity: usize },

    // -- Document import --
    #[error("picked document has no usable file name: {0:?}")]
    InvalidFileName(String),

    #[error("picked document could not be opened: {0}")]
    DocumentUnavailable(String),

    #[error("no native core registered to receive the imported file")]
    NativeCoreMissing,

    // -- Lifecycle --
    #[error("UI task was dropped before it ran")]
    TaskDropped,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShimError>;
