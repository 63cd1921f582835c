//! Browser adapters for the portal core.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` implements the core HTTP seam with `gloo-net`; `storage`
//! implements the key/value seam with `localStorage` and `sessionStorage`.

pub mod storage;
pub mod transport;
