// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup. On Android `tracing` events reach logcat through its `log`
// feature and `android_logger`; elsewhere `tracing-subscriber` writes them to
// stderr.

use std::sync::Once;

use skyemu_core::config::ShimConfig;

static INIT: Once = Once::new();

/// Initialise logging once per process. Later calls are ignored.
pub fn init(config: &ShimConfig) {
    INIT.call_once(|| {
        install(config);
        install_panic_hook();
        tracing::debug!(level = %config.log_level, "logging initialised");
    });
}

#[cfg(target_os = "android")]
fn install(config: &ShimConfig) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(max_level(&config.log_level))
            .with_tag(config.log_tag.clone()),
    );
}

#[cfg(not(target_os = "android"))]
fn install(config: &ShimConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    // A host or test harness may already own the global subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Level of a bare filter such as "debug". Directive lists fall back to info.
#[cfg(target_os = "android")]
fn max_level(filter: &str) -> log::LevelFilter {
    filter.trim().parse().unwrap_or(log::LevelFilter::Info)
}

/// Route panic messages through the logger before the default hook runs.
fn install_panic_hook() {
    let default = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_owned());
        tracing::error!(%location, "panic: {payload}");
        default(info);
    }));
}
