//! Process-wide authentication state and the navigation policy built on it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns who is logged in; `route_guard` watches it and decides which
//! route may render. Views receive both by dependency passing (Leptos context
//! in the browser, plain `Arc`s in the CLI).

pub mod route_guard;
pub mod session;
