//! Small shared helpers for the flow controllers and views.
//!
//! SYSTEM CONTEXT
//! ==============
//! `in_flight` and `liveness` implement the request-deduplication and
//! late-response rules every async view follows; `email` holds the signup
//! address policy.

pub mod email;
pub mod in_flight;
pub mod liveness;
