// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages handed to the native core, which owns the
// on-screen presentation.

use crate::error::ShimError;

/// Severity of an error from the player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying again may well work.
    Transient,
    /// The player must do something first (free space, grant access, pick another file).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A plain-language error with a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary.
    pub message: String,
    /// What the player should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `ShimError` into a `HumanError`.
pub fn humanize_error(err: &ShimError) -> HumanError {
    match err {
        ShimError::EventQueueFull { .. } => HumanError {
            message: "Some key presses were lost.".into(),
            suggestion: "Type a little slower, then check the text.".into(),
            severity: Severity::Transient,
        },

        ShimError::InvalidFileName(name) => HumanError {
            message: "That file can't be opened.".into(),
            suggestion: format!("Rename the file and pick it again. (Name: {name:?})"),
            severity: Severity::ActionRequired,
        },

        ShimError::DocumentUnavailable(detail) => HumanError {
            message: "The chosen file couldn't be read.".into(),
            suggestion: format!(
                "Make sure the file is still there and try picking it again. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        ShimError::NativeCoreMissing | ShimError::TaskDropped => {
            HumanError {
                message: "The emulator isn't ready yet.".into(),
                suggestion: "Wait a moment, then try again.".into(),
                severity: Severity::Transient,
            }
        }

        ShimError::Io(io_err) => humanize_io(io_err),

        ShimError::Serialization(detail) => HumanError {
            message: "The shim settings are invalid.".into(),
            suggestion: format!("Reinstall the app to restore default settings. ({detail})"),
            severity: Severity::Permanent,
        },

        ShimError::Bridge(detail) => HumanError {
            message: "Android refused the request.".into(),
            suggestion: format!("Try again. If this keeps happening, restart the app. ({detail})"),
            severity: Severity::Transient,
        },

        ShimError::PlatformUnavailable => HumanError {
            message: "This isn't supported on this device.".into(),
            suggestion: "Use the desktop build for this feature.".into(),
            severity: Severity::Permanent,
        },
    }
}

fn humanize_io(err: &std::io::Error) -> HumanError {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => HumanError {
            message: "There isn't enough space to copy the file.".into(),
            suggestion: "Free up some storage, then pick the file again.".into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::PermissionDenied => HumanError {
            message: "The app isn't allowed to read that file.".into(),
            suggestion: "Grant storage access in Settings, or pick a file from another folder."
                .into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::NotFound => HumanError {
            message: "The file has disappeared.".into(),
            suggestion: "It may have been moved or deleted. Pick it again.".into(),
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "Copying the file failed.".into(),
            suggestion: format!("Try again. ({err})"),
            severity: Severity::Transient,
        },
    }
}
