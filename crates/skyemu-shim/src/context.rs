// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `ShimContext`: all shim state for one host activity.
//
// Methods fall into two groups. The `on_*` callbacks and `run_ui_tasks` are
// called by the host on its UI thread. Everything else is safe from any
// thread, which is where the native core calls from.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{info, warn};

use skyemu_bridge::traits::{PlatformBridge, ShadowTextField};
use skyemu_core::config::ShimConfig;
use skyemu_core::error::{Result, ShimError};
use skyemu_core::types::{DocumentLocator, ImportState, KeyEvent, PermissionGrant, VisibleRect};

use crate::events::KeyEventQueue;
use crate::geometry::GeometryCache;
use crate::immersive::ImmersiveMode;
use crate::import::{DocumentImporter, ImportOutcome};
use crate::keyboard::{poll_keyboard, PollReport};
use crate::native::NativeCore;
use crate::permissions;
use crate::ui::{Completion, UiCommand, UiDispatcher};

/// Everything the shim knows about the running activity.
pub struct ShimContext {
    config: ShimConfig,
    bridge: Box<dyn PlatformBridge>,
    field: Mutex<Option<Box<dyn ShadowTextField>>>,
    events: KeyEventQueue,
    geometry: GeometryCache,
    importer: DocumentImporter,
    immersive: ImmersiveMode,
    ui: UiDispatcher,
    core: RwLock<Option<Arc<dyn NativeCore>>>,
}

impl ShimContext {
    pub fn new(config: ShimConfig, bridge: Box<dyn PlatformBridge>) -> Self {
        Self {
            events: KeyEventQueue::from_config(&config),
            geometry: GeometryCache::new(&config),
            importer: DocumentImporter::new(&config),
            immersive: ImmersiveMode::new(config.immersive_min_api_level),
            ui: UiDispatcher::new(),
            field: Mutex::new(None),
            core: RwLock::new(None),
            bridge,
            config,
        }
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    pub fn platform_name(&self) -> &str {
        self.bridge.platform_name()
    }

    fn field(&self) -> MutexGuard<'_, Option<Box<dyn ShadowTextField>>> {
        self.field.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -----------------------------------------------------------------------
    // Native core registration
    // -----------------------------------------------------------------------

    pub fn set_native_core(&self, core: Option<Arc<dyn NativeCore>>) {
        *self.core.write().unwrap_or_else(|e| e.into_inner()) = core;
    }

    pub fn native_core(&self) -> Option<Arc<dyn NativeCore>> {
        self.core.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    // -----------------------------------------------------------------------
    // Native core queries (any thread)
    // -----------------------------------------------------------------------

    /// Next raw key code, `-1` when there is none.
    pub fn next_event(&self) -> i32 {
        self.events.pop()
    }

    /// Next key event, skipping batch markers.
    pub fn next_key(&self) -> Option<KeyEvent> {
        self.events.next_key()
    }

    pub fn events(&self) -> &KeyEventQueue {
        &self.events
    }

    pub fn visible_top(&self) -> f32 {
        self.geometry.visible_top()
    }

    pub fn visible_bottom(&self) -> f32 {
        self.geometry.visible_bottom()
    }

    pub fn dpi_scale(&self) -> f32 {
        self.geometry.dpi_scale()
    }

    pub fn language(&self) -> String {
        self.geometry.language()
    }

    pub fn import_state(&self) -> ImportState {
        self.importer.state()
    }

    // -----------------------------------------------------------------------
    // Native core requests (any thread, run later on the UI thread)
    // -----------------------------------------------------------------------

    pub fn show_keyboard(&self) -> Completion {
        self.ui.dispatch(UiCommand::ShowKeyboard)
    }

    pub fn hide_keyboard(&self) -> Completion {
        self.ui.dispatch(UiCommand::HideKeyboard)
    }

    pub fn request_keyboard_poll(&self) -> Completion {
        self.ui.dispatch(UiCommand::PollKeyboard)
    }

    pub fn open_document(&self) -> Completion {
        self.ui.dispatch(UiCommand::OpenDocument)
    }

    pub fn reapply_immersive(&self) -> Completion {
        self.ui.dispatch(UiCommand::ReapplyImmersive)
    }

    // -----------------------------------------------------------------------
    // Host callbacks (UI thread)
    // -----------------------------------------------------------------------

    /// Install the shadow field, read metrics and locale, and enter
    /// immersive mode. A failing step is logged and the rest still run.
    pub fn on_create(&self) {
        match self.bridge.install_shadow_field() {
            Ok(field) => *self.field() = Some(field),
            Err(e) => warn!(error = %e, "shadow field unavailable, keyboard input disabled"),
        }
        self.geometry.refresh(&*self.bridge);
        if let Err(e) = self.immersive.enable(&*self.bridge) {
            warn!(error = %e, "could not enter immersive mode");
        }
        info!(platform = self.platform_name(), "shim created");
    }

    /// Drain pending UI tasks. Returns how many ran.
    pub fn run_ui_tasks(&self) -> usize {
        self.ui.run_pending(|command| self.run_command(command))
    }

    fn run_command(&self, command: UiCommand) -> Result<()> {
        match command {
            UiCommand::ShowKeyboard => self.bridge.show_soft_keyboard(),
            UiCommand::HideKeyboard => self.bridge.hide_soft_keyboard(),
            UiCommand::PollKeyboard => self.poll_keyboard_now().map(|_| ()),
            UiCommand::OpenDocument => self.importer.launch(&*self.bridge),
            UiCommand::ReapplyImmersive => self.immersive.enable(&*self.bridge).map(|_| ()),
        }
    }

    /// Diff the shadow field into the event queue right away.
    pub fn poll_keyboard_now(&self) -> Result<PollReport> {
        let mut slot = self.field();
        let field = slot
            .as_mut()
            .ok_or_else(|| ShimError::Bridge("shadow field not installed".into()))?;
        poll_keyboard(&mut **field, &self.events)
    }

    pub fn on_global_layout(&self, rect: VisibleRect) {
        self.geometry.set_visible_rect(rect);
    }

    pub fn on_configuration_changed(&self) {
        self.geometry.refresh(&*self.bridge);
    }

    pub fn on_activity_result(
        &self,
        request_code: i32,
        result_code: i32,
        data: Option<DocumentLocator>,
    ) -> ImportOutcome {
        let core = self.native_core();
        self.importer
            .on_activity_result(&*self.bridge, core.as_deref(), request_code, result_code, data)
    }

    pub fn on_permissions_result(&self, request_code: i32, grant_results: &[i32]) -> Option<PermissionGrant> {
        permissions::on_permissions_result(request_code, grant_results)
    }

    /// Returns whether immersive mode was reapplied.
    pub fn on_system_ui_visibility_change(&self, visibility: i32) -> bool {
        self.immersive
            .on_visibility_change(&*self.bridge, visibility)
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not reapply immersive mode");
                false
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyemu_core::types::{BATCH_MARKER, NO_EVENT};

    use crate::test_support::{FakeBridge, RecordingCore};

    fn context(bridge: &FakeBridge) -> ShimContext {
        let ctx = ShimContext::new(ShimConfig::default(), Box::new(bridge.clone()));
        ctx.on_create();
        ctx
    }

    #[test]
    fn create_installs_field_reads_display_and_goes_immersive() {
        let bridge = FakeBridge::new();
        let ctx = context(&bridge);
        assert_eq!(bridge.calls(), vec!["install_shadow_field", "system_ui:0x1706"]);
        assert_eq!(ctx.language(), "fr_FR");
        assert_eq!(ctx.dpi_scale(), 2.0);
        assert_eq!(ctx.visible_top(), 0.0);
    }

    #[test]
    fn keyboard_requests_wait_for_the_ui_thread() {
        let bridge = FakeBridge::new();
        let ctx = context(&bridge);
        let _ = ctx.show_keyboard();
        let _ = ctx.hide_keyboard();
        assert_eq!(bridge.calls().len(), 2);

        assert_eq!(ctx.run_ui_tasks(), 2);
        assert_eq!(&bridge.calls()[2..], ["show_keyboard", "hide_keyboard"]);
    }

    #[test]
    fn typed_text_reaches_the_native_core() {
        let bridge = FakeBridge::new();
        let ctx = context(&bridge);
        bridge.field.type_text("ok\n");

        let mut done = ctx.request_keyboard_poll();
        ctx.run_ui_tasks();
        assert!(matches!(done.try_result(), Some(Ok(()))));

        assert_eq!(ctx.next_event(), BATCH_MARKER);
        assert_eq!(ctx.next_key(), Some(KeyEvent::Char('o')));
        assert_eq!(ctx.next_key(), Some(KeyEvent::Char('k')));
        assert_eq!(ctx.next_key(), Some(KeyEvent::Enter));
        assert_eq!(ctx.next_event(), NO_EVENT);
        assert!(bridge.field.current().is_baseline());
    }

    #[test]
    fn layout_updates_visible_area() {
        let bridge = FakeBridge::new();
        let ctx = context(&bridge);
        ctx.on_global_layout(VisibleRect { left: 0, top: 48, right: 1080, bottom: 1500 });
        assert_eq!(ctx.visible_top(), 48.0);
        assert_eq!(ctx.visible_bottom(), 1500.0);
    }

    #[test]
    fn import_goes_to_registered_core() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = FakeBridge::with_files_dir(dir.path());
        let ctx = context(&bridge);
        let core = Arc::new(RecordingCore::default());
        ctx.set_native_core(Some(core.clone()));
        bridge.add_document("content://docs/document/9", Some("rom.bin"), b"rom");

        let _ = ctx.open_document();
        ctx.run_ui_tasks();
        assert_eq!(ctx.import_state(), ImportState::PickerLaunched);

        let outcome = ctx.on_activity_result(123, -1, Some(DocumentLocator::new("content://docs/document/9")));

        assert!(matches!(outcome, ImportOutcome::Imported(_)));
        assert_eq!(core.loads(), vec![dir.path().join("rom.bin")]);
    }

    #[test]
    fn bars_returning_are_hidden_again() {
        let bridge = FakeBridge::new();
        let ctx = context(&bridge);
        assert!(ctx.on_system_ui_visibility_change(0));
        assert!(!ctx.on_system_ui_visibility_change(0x4));
    }

    #[test]
    fn permission_results_are_reported() {
        let bridge = FakeBridge::new();
        let ctx = context(&bridge);
        assert!(ctx.on_permissions_result(501, &[0, 0]).is_some_and(|g| g.all_granted()));
        assert!(ctx.on_permissions_result(7, &[0]).is_none());
    }

    #[test]
    fn poll_without_field_fails_cleanly() {
        let bridge = FakeBridge::new();
        let ctx = ShimContext::new(ShimConfig::default(), Box::new(bridge));
        assert!(ctx.poll_keyboard_now().is_err());
        assert_eq!(ctx.next_event(), NO_EVENT);
    }
}
