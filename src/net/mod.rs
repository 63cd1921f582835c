//! Networking modules for the portal REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the raw request/response seam, `api` is the typed client
//! that attaches the bearer token and normalizes failures, and `types`
//! defines the wire schema.

pub mod api;
#[cfg(test)]
pub(crate) mod mock;
pub mod transport;
pub mod types;
