//! Reactive view state provided through Leptos context.

pub mod auth;
