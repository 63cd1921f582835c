//! OTP-gated signup verification and password reset.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each page of a flow owns one controller for its lifetime. The cached email
//! (volatile storage) is what links the pages together: the OTP page rebuilds
//! its state from the cache, so reaching it without a prior submission in the
//! same tab redirects back to the start.
//!
//! DESIGN
//! ======
//! Controllers take `&self` and keep their state behind a mutex that is never
//! held across an await. Every network action has its own [`InFlight`] slot so
//! a double click is a no-op. Results arriving after `teardown` are discarded.
//!
//! ERROR HANDLING
//! ==============
//! Failures leave the phase unchanged and set `error` to the inline message.
//! Network and server failures differ only in wording.
//!
//! [`InFlight`]: crate::util::in_flight::InFlight

pub mod countdown;
pub mod reset;
pub mod signup;

use std::time::Duration;

use crate::error::PortalError;
use crate::state::route_guard::AppRoute;

/// What the view should do after a flow operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowStep {
    /// Remain on the current page (includes ignored double clicks).
    Stay,
    Redirect(AppRoute),
    /// Show the success message, then navigate.
    RedirectAfter { route: AppRoute, delay: Duration },
    /// The view was torn down before the response arrived.
    Discarded,
}

pub type FlowResult = Result<FlowStep, PortalError>;

/// Local check on an OTP entry: non-empty and exactly `length` characters.
///
/// # Errors
///
/// Returns a validation error describing the problem.
pub fn validate_code(code: &str, length: usize) -> Result<String, PortalError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(PortalError::validation("Please enter the OTP"));
    }
    if code.chars().count() != length {
        return Err(PortalError::validation(format!("Please enter the complete {length}-digit OTP")));
    }
    Ok(code.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_code_checks_presence_and_length() {
        assert_eq!(validate_code(" 1234 ", 4).as_deref(), Ok("1234"));
        assert_eq!(validate_code("", 4), Err(PortalError::validation("Please enter the OTP")));
        assert_eq!(
            validate_code("123", 4),
            Err(PortalError::validation("Please enter the complete 4-digit OTP"))
        );
        assert!(validate_code("123456", 6).is_ok());
    }
}
