// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the SkyEmu Android shim.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

// ---------------------------------------------------------------------------
// Key events
// ---------------------------------------------------------------------------

/// Returned by the event getter when the queue is empty.
pub const NO_EVENT: i32 = -1;

/// Queued at the start of every keyboard poll. Consumers skip it.
pub const BATCH_MARKER: i32 = -2;

/// Bit 30 tags a synthetic navigation/editing key, as opposed to a literal
/// character.
pub const SYNTHETIC_KEY: i32 = 0x4000_0000;

const LEFT_ARROW: i32 = 1;
const RIGHT_ARROW: i32 = 2;
const BACKSPACE: i32 = 11;
const ENTER: i32 = 13;

/// One entry of the key-event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// A literal character, delivered as its scalar value.
    Char(char),
    Enter,
    Backspace,
    Left,
    Right,
    /// Start of a keyboard-poll batch.
    BatchMarker,
}

impl KeyEvent {
    /// Wire code consumed by the native core.
    pub fn code(self) -> i32 {
        match self {
            Self::Char(c) => c as u32 as i32,
            Self::Enter => ENTER | SYNTHETIC_KEY,
            Self::Backspace => BACKSPACE | SYNTHETIC_KEY,
            Self::Left => LEFT_ARROW | SYNTHETIC_KEY,
            Self::Right => RIGHT_ARROW | SYNTHETIC_KEY,
            Self::BatchMarker => BATCH_MARKER,
        }
    }

    /// Decode a wire code. `NO_EVENT` and unknown synthetic keys yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            BATCH_MARKER => Some(Self::BatchMarker),
            c if c >= 0 && c & SYNTHETIC_KEY != 0 => match c & !SYNTHETIC_KEY {
                ENTER => Some(Self::Enter),
                BACKSPACE => Some(Self::Backspace),
                LEFT_ARROW => Some(Self::Left),
                RIGHT_ARROW => Some(Self::Right),
                _ => None,
            },
            c if c >= 0 => char::from_u32(c as u32).map(Self::Char),
            _ => None,
        }
    }

    pub fn is_marker(self) -> bool {
        self == Self::BatchMarker
    }
}

// ---------------------------------------------------------------------------
// Shadow text field
// ---------------------------------------------------------------------------

/// Number of sentinels on each side of the shadow field.
pub const SHADOW_PAD: usize = 8;

/// Left-padding sentinel. Deleting one means the user pressed Backspace.
pub const LEFT_PAD: char = '\u{1}';

/// Right-padding sentinel.
pub const RIGHT_PAD: char = '\u{2}';

/// Content of the shadow field at rest: 8 left then 8 right sentinels.
pub fn shadow_baseline() -> String {
    let mut s = String::with_capacity(SHADOW_PAD * 2);
    s.extend(std::iter::repeat_n(LEFT_PAD, SHADOW_PAD));
    s.extend(std::iter::repeat_n(RIGHT_PAD, SHADOW_PAD));
    s
}

/// Text and cursor of the shadow field, offsets in Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub text: String,
    pub cursor: usize,
}

impl FieldSnapshot {
    pub fn baseline() -> Self {
        Self {
            text: shadow_baseline(),
            cursor: SHADOW_PAD,
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.cursor == SHADOW_PAD && self.text == shadow_baseline()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// On-screen content rectangle reported by the last layout pass, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibleRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Real display metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayMetrics {
    /// Physical pixels per inch along X.
    pub xdpi: f32,
    /// Physical pixels per inch along Y.
    pub ydpi: f32,
    pub width_px: i32,
    pub height_px: i32,
}

// ---------------------------------------------------------------------------
// Activity callbacks
// ---------------------------------------------------------------------------

/// `startActivityForResult` request code for the document picker.
pub const FILE_PICKER_REQUEST_CODE: i32 = 123;

/// `requestPermissions` request code for external storage access.
pub const STORAGE_PERMISSION_REQUEST_CODE: i32 = 501;

/// Outcome reported by `onActivityResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityResult {
    /// `RESULT_OK`
    Ok,
    /// `RESULT_CANCELED`
    Cancelled,
    /// `RESULT_FIRST_USER` and above.
    Other(i32),
}

impl ActivityResult {
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::Ok,
            0 => Self::Cancelled,
            other => Self::Other(other),
        }
    }
}

/// Storage permission outcome, `[write, read]` in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionGrant {
    pub write: bool,
    pub read: bool,
}

impl PermissionGrant {
    /// Parse `grantResults` where `0` (`PERMISSION_GRANTED`) means granted.
    /// Missing entries count as denied.
    pub fn from_results(results: &[i32]) -> Self {
        let granted = |i: usize| results.get(i).is_some_and(|&r| r == 0);
        Self {
            write: granted(0),
            read: granted(1),
        }
    }

    pub fn all_granted(&self) -> bool {
        self.write && self.read
    }
}

// ---------------------------------------------------------------------------
// Window flags
// ---------------------------------------------------------------------------

/// `WindowManager.LayoutParams.FLAG_ALT_FOCUSABLE_IM`
pub const FLAG_ALT_FOCUSABLE_IM: i32 = 0x0002_0000;

/// `View.SYSTEM_UI_FLAG_*` bits used for immersive mode.
pub mod system_ui {
    pub const HIDE_NAVIGATION: i32 = 0x0000_0002;
    pub const FULLSCREEN: i32 = 0x0000_0004;
    pub const LAYOUT_STABLE: i32 = 0x0000_0100;
    pub const LAYOUT_HIDE_NAVIGATION: i32 = 0x0000_0200;
    pub const LAYOUT_FULLSCREEN: i32 = 0x0000_0400;
    pub const IMMERSIVE_STICKY: i32 = 0x0000_1000;

    /// Sticky immersive full-screen with the layout extended under the bars.
    pub const IMMERSIVE: i32 = LAYOUT_STABLE
        | LAYOUT_HIDE_NAVIGATION
        | LAYOUT_FULLSCREEN
        | HIDE_NAVIGATION
        | FULLSCREEN
        | IMMERSIVE_STICKY;
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Opaque OS locator of a picked document (a `content://` or `file://` URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLocator(pub String);

impl DocumentLocator {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn url(&self) -> Option<Url> {
        Url::parse(&self.0).ok()
    }

    /// URI scheme, e.g. `content`. `None` for bare paths.
    pub fn scheme(&self) -> Option<String> {
        self.url().map(|u| u.scheme().to_owned())
    }

    /// Percent-decoded path component, without authority, query or fragment.
    pub fn path(&self) -> String {
        let raw = match self.url() {
            Some(url) => url.path().to_owned(),
            None => {
                let end = self.0.find(['?', '#']).unwrap_or(self.0.len());
                self.0[..end].to_owned()
            }
        };
        percent_decode_str(&raw).decode_utf8_lossy().into_owned()
    }

    /// Last segment of the decoded path, the name of last resort.
    pub fn last_path_segment(&self) -> String {
        let path = self.path();
        match path.rfind('/') {
            Some(i) => path[i + 1..].to_owned(),
            None => path,
        }
    }

    pub fn is_content(&self) -> bool {
        self.scheme().as_deref() == Some("content")
    }
}

impl std::fmt::Display for DocumentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of one document import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImportState {
    #[default]
    Idle,
    /// Picker intent dispatched, waiting for `onActivityResult`.
    PickerLaunched,
    /// Result arrived with a document; copy in progress.
    CallbackReceived,
    /// Copied into private storage and handed to the native core.
    Copied { path: PathBuf },
    /// Copy or hand-off failed.
    Failed { reason: String },
}
