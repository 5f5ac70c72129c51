//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, pointer, press-and-hold)
//! - Storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod storage;

pub use input::{Action, InputRouter, Key};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Host clock in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Host clock in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}
