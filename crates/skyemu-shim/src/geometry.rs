// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cached display geometry and locale, written by UI callbacks and read by
// the native core's getters.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use skyemu_bridge::traits::NativeDisplay;
use skyemu_core::config::ShimConfig;
use skyemu_core::types::{DisplayMetrics, VisibleRect};

#[derive(Debug, Default)]
struct Cached {
    visible: Option<VisibleRect>,
    metrics: Option<DisplayMetrics>,
    locale: Option<String>,
}

/// Last known layout, metrics and locale.
#[derive(Debug)]
pub struct GeometryCache {
    cached: RwLock<Cached>,
    dpi_reference: f32,
    fallback_language: String,
}

impl GeometryCache {
    pub fn new(config: &ShimConfig) -> Self {
        Self {
            cached: RwLock::new(Cached::default()),
            dpi_reference: config.dpi_reference,
            fallback_language: config.fallback_language.clone(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Cached> {
        self.cached.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cached> {
        self.cached.write().unwrap_or_else(|e| e.into_inner())
    }

    // -- Writers (UI thread) --

    pub fn set_visible_rect(&self, rect: VisibleRect) {
        self.write().visible = Some(rect);
    }

    pub fn set_metrics(&self, metrics: DisplayMetrics) {
        self.write().metrics = Some(metrics);
    }

    pub fn set_locale(&self, tag: impl Into<String>) {
        self.write().locale = Some(tag.into());
    }

    /// Re-read metrics and locale from the platform. A failed query keeps the
    /// previous value.
    pub fn refresh(&self, display: &dyn NativeDisplay) {
        match display.display_metrics() {
            Ok(metrics) => {
                debug!(xdpi = metrics.xdpi, width = metrics.width_px, height = metrics.height_px, "display metrics updated");
                self.set_metrics(metrics);
            }
            Err(e) => warn!(error = %e, "display metrics unavailable"),
        }
        match display.locale_tag() {
            Ok(tag) if !tag.is_empty() => {
                debug!(locale = %tag, "locale updated");
                self.set_locale(tag);
            }
            Ok(_) => warn!("platform reported an empty locale"),
            Err(e) => warn!(error = %e, "locale unavailable"),
        }
    }

    // -- Getters (native core) --

    pub fn visible_rect(&self) -> Option<VisibleRect> {
        self.read().visible
    }

    /// Top of the visible area in pixels, `0.0` before the first layout.
    pub fn visible_top(&self) -> f32 {
        self.visible_rect().map_or(0.0, |r| r.top as f32)
    }

    /// Bottom of the visible area in pixels, `0.0` before the first layout.
    pub fn visible_bottom(&self) -> f32 {
        self.visible_rect().map_or(0.0, |r| r.bottom as f32)
    }

    pub fn metrics(&self) -> Option<DisplayMetrics> {
        self.read().metrics
    }

    /// Horizontal DPI relative to the reference DPI, `1.0` until known.
    pub fn dpi_scale(&self) -> f32 {
        match self.metrics() {
            Some(m) if m.xdpi > 0.0 && self.dpi_reference > 0.0 => m.xdpi / self.dpi_reference,
            _ => 1.0,
        }
    }

    pub fn language(&self) -> String {
        self.read()
            .locale
            .clone()
            .unwrap_or_else(|| self.fallback_language.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBridge;

    fn cache() -> GeometryCache {
        GeometryCache::new(&ShimConfig::default())
    }

    #[test]
    fn neutral_values_before_first_update() {
        let geometry = cache();
        assert_eq!(geometry.visible_top(), 0.0);
        assert_eq!(geometry.visible_bottom(), 0.0);
        assert_eq!(geometry.dpi_scale(), 1.0);
        assert_eq!(geometry.language(), "en_US");
    }

    #[test]
    fn latest_layout_wins() {
        let geometry = cache();
        geometry.set_visible_rect(VisibleRect { left: 0, top: 10, right: 1080, bottom: 2000 });
        geometry.set_visible_rect(VisibleRect { left: 0, top: 24, right: 1080, bottom: 1200 });
        assert_eq!(geometry.visible_top(), 24.0);
        assert_eq!(geometry.visible_bottom(), 1200.0);
    }

    #[test]
    fn dpi_scale_is_relative_to_reference() {
        let geometry = cache();
        geometry.set_metrics(DisplayMetrics { xdpi: 480.0, ydpi: 478.0, width_px: 1080, height_px: 2340 });
        assert_eq!(geometry.dpi_scale(), 4.0);

        let custom = GeometryCache::new(&ShimConfig { dpi_reference: 160.0, ..ShimConfig::default() });
        custom.set_metrics(DisplayMetrics { xdpi: 480.0, ..DisplayMetrics::default() });
        assert_eq!(custom.dpi_scale(), 3.0);
    }

    #[test]
    fn zero_dpi_falls_back_to_unit_scale() {
        let geometry = cache();
        geometry.set_metrics(DisplayMetrics::default());
        assert_eq!(geometry.dpi_scale(), 1.0);
    }

    #[test]
    fn refresh_reads_platform() {
        let bridge = FakeBridge::new();
        let geometry = cache();
        geometry.refresh(&bridge);
        assert_eq!(geometry.language(), "fr_FR");
        assert_eq!(geometry.dpi_scale(), 2.0);
    }

    #[test]
    fn failed_refresh_keeps_previous_values() {
        let bridge = FakeBridge::new();
        let geometry = cache();
        geometry.refresh(&bridge);
        bridge.set_display_failing(true);
        geometry.refresh(&bridge);
        assert_eq!(geometry.language(), "fr_FR");
        assert_eq!(geometry.dpi_scale(), 2.0);
    }
}
