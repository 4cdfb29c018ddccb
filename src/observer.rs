//! Hooks into the chat controller.
//!
//! This module provides the [`ChatObserver`] trait that lets a front end (or
//! a test) watch everything passing through the [`crate::ChatController`]
//! without owning it.

use crate::controller::Phase;
use crate::transport::HttpResponse;
use crate::types::{GenerateRequest, Turn};

/// A trait for observing chat controller activity.
///
/// Every method has an empty default, so implementors only override what
/// they care about.
///
/// # Example
///
/// ```rust
/// use netdoctor::{ChatObserver, Phase};
///
/// struct Spinner;
///
/// impl ChatObserver for Spinner {
///     fn phase_changed(&self, phase: &Phase) {
///         if phase.is_sending() {
///             eprintln!("El asistente está respondiendo...");
///         }
///     }
/// }
/// ```
pub trait ChatObserver: Send + Sync {
    /// Called on every state-machine transition.
    fn phase_changed(&self, phase: &Phase) {
        _ = phase;
    }

    /// Called after a turn was appended to the conversation.
    fn turn_appended(&self, turn: &Turn) {
        _ = turn;
    }

    /// Called once per submission, before the first attempt is made.
    fn request_built(&self, request: &GenerateRequest) {
        _ = request;
    }

    /// Called with the terminal response of a submission, after retries.
    fn response_received(&self, response: &HttpResponse) {
        _ = response;
    }
}
