//! # client
//!
//! Leptos + WASM front-end for the academic portal.
//!
//! This crate holds the pages, dashboard components, and browser adapters
//! (storage, HTTP transport, timers). Session, routing, and flow logic live in
//! the `portal` crate; pages only bind them to signals and the router.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
