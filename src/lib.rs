//! # portal
//!
//! Client-side core for the academic portal: the REST adapter, the session
//! store, the route guard, and the OTP-gated signup and password-reset flows.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `client` crate (Leptos UI) and the `cli` crate both drive these types.
//! Nothing here touches the DOM; browser storage and the browser HTTP
//! transport are plugged in through the [`storage::Storage`] and
//! [`net::transport::Transport`] traits.

pub mod config;
pub mod error;
pub mod filters;
pub mod flow;
pub mod mcq;
pub mod net;
pub mod state;
pub mod storage;
pub mod util;

pub use config::PortalConfig;
pub use error::PortalError;
