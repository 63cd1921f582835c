//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`. Auth pages build their own flow controller on mount and
//! tear it down on cleanup.

pub mod dashboard;
pub mod forgot_password;
pub mod landing;
pub mod login;
pub mod otp_verification;
pub mod reset_password;
pub mod signup;
pub mod verify_reset_otp;
