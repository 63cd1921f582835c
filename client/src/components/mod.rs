//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render dashboard panels and route chrome while reading shared
//! state from Leptos context providers.

pub mod course_panel;
pub mod guarded;
pub mod material_panel;
pub mod mcq_panel;
pub mod profile_card;
pub mod user_panel;
