// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shim configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Runtime settings for the shim. Every field has a default, so a partial
/// JSON document (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Dots-per-inch that maps to a UI scale of 1.0.
    pub dpi_reference: f32,
    /// Maximum number of undelivered key events.
    pub event_queue_capacity: usize,
    /// Skip queuing a batch marker when the newest queued code already is one.
    pub coalesce_batch_markers: bool,
    /// Read buffer size used when copying a picked document.
    pub copy_buffer_size: usize,
    /// Optional directory under external files that receives imports.
    pub import_subdir: Option<String>,
    /// Locale tag reported before the platform locale is known.
    pub fallback_language: String,
    /// Lowest API level that gets sticky immersive mode.
    pub immersive_min_api_level: i32,
    /// Logcat tag.
    pub log_tag: String,
    /// Default log filter (e.g. "info", "skyemu_shim=debug").
    pub log_level: String,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            dpi_reference: 120.0,
            event_queue_capacity: 4096,
            coalesce_batch_markers: true,
            copy_buffer_size: 8 * 1024,
            import_subdir: None,
            fallback_language: "en_US".into(),
            immersive_min_api_level: 19,
            log_tag: "SkyEmu".into(),
            log_level: "info".into(),
        }
    }
}

impl ShimConfig {
    /// Parse from JSON text. Empty or whitespace-only input yields defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a JSON file; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_platform_conventions() {
        let config = ShimConfig::default();
        assert_eq!(config.dpi_reference, 120.0);
        assert_eq!(config.log_tag, "SkyEmu");
        assert_eq!(config.immersive_min_api_level, 19);
        assert!(config.import_subdir.is_none());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            ShimConfig::from_json(r#"{ "event_queue_capacity": 16, "import_subdir": "roms" }"#)
                .expect("parse");
        assert_eq!(config.event_queue_capacity, 16);
        assert_eq!(config.import_subdir.as_deref(), Some("roms"));
        assert_eq!(config.copy_buffer_size, 8 * 1024);
    }

    #[test]
    fn empty_text_is_default() {
        assert_eq!(ShimConfig::from_json("  \n").expect("parse"), ShimConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ShimConfig::from_json("{ nope").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ShimConfig::load(dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ShimConfig::default());
    }

    #[test]
    fn file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shim.json");
        std::fs::write(&path, r#"{ "log_level": "debug" }"#).expect("write");
        let config = ShimConfig::load(&path).expect("load");
        assert_eq!(config.log_level, "debug");
    }
}
