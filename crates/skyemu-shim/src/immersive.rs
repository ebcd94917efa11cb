// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sticky immersive full-screen.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use skyemu_bridge::traits::{NativeDisplay, NativeWindowChrome};
use skyemu_core::error::Result;
use skyemu_core::types::system_ui;

/// Whether the system bars came back and immersive mode must be reapplied.
pub fn needs_reapply(visibility: i32) -> bool {
    visibility & system_ui::FULLSCREEN == 0
}

/// Immersive mode for one activity.
#[derive(Debug)]
pub struct ImmersiveMode {
    min_api_level: i32,
    active: AtomicBool,
}

impl ImmersiveMode {
    pub fn new(min_api_level: i32) -> Self {
        Self {
            min_api_level,
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Enter immersive mode if the platform supports it. Returns whether the
    /// flags were applied.
    pub fn enable<B>(&self, bridge: &B) -> Result<bool>
    where
        B: NativeDisplay + NativeWindowChrome + ?Sized,
    {
        let api_level = bridge.api_level()?;
        if api_level < self.min_api_level {
            info!(api_level, min = self.min_api_level, "immersive mode not supported");
            return Ok(false);
        }
        bridge.set_system_ui_visibility(system_ui::IMMERSIVE)?;
        self.active.store(true, Ordering::Relaxed);
        debug!(api_level, "immersive mode enabled");
        Ok(true)
    }

    /// Handle a system UI visibility change. Returns whether the flags were
    /// reapplied.
    pub fn on_visibility_change<B>(&self, bridge: &B, visibility: i32) -> Result<bool>
    where
        B: NativeWindowChrome + ?Sized,
    {
        if !self.is_active() || !needs_reapply(visibility) {
            return Ok(false);
        }
        bridge.set_system_ui_visibility(system_ui::IMMERSIVE)?;
        debug!(visibility = format_args!("{visibility:#x}"), "immersive mode reapplied");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBridge;

    #[test]
    fn reapply_only_when_fullscreen_bit_is_clear() {
        assert!(needs_reapply(0));
        assert!(needs_reapply(system_ui::HIDE_NAVIGATION));
        assert!(!needs_reapply(system_ui::FULLSCREEN));
        assert!(!needs_reapply(system_ui::IMMERSIVE));
    }

    #[test]
    fn enable_sets_sticky_flags() {
        let bridge = FakeBridge::new();
        let mode = ImmersiveMode::new(19);
        assert!(mode.enable(&bridge).unwrap());
        assert!(mode.is_active());
        assert_eq!(bridge.calls(), vec!["system_ui:0x1706"]);
    }

    #[test]
    fn old_platforms_are_left_alone() {
        let bridge = FakeBridge::new();
        bridge.set_api_level(18);
        let mode = ImmersiveMode::new(19);
        assert!(!mode.enable(&bridge).unwrap());
        assert!(!mode.on_visibility_change(&bridge, 0).unwrap());
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn bars_returning_triggers_reapply() {
        let bridge = FakeBridge::new();
        let mode = ImmersiveMode::new(19);
        mode.enable(&bridge).unwrap();

        assert!(!mode.on_visibility_change(&bridge, system_ui::IMMERSIVE).unwrap());
        assert!(mode.on_visibility_change(&bridge, 0).unwrap());
        assert_eq!(bridge.calls(), vec!["system_ui:0x1706", "system_ui:0x1706"]);
    }
}
