//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction that allows
//! for different output styles.  The default implementation uses ANSI
//! escape codes to tell the user's turns, the assistant's turns, and the
//! error banner apart.

use std::io::{self, Stdout, Write};

use crate::controller::Phase;
use crate::observer::ChatObserver;
use crate::types::{Role, Turn};

/// ANSI escape code for dim text (used for the waiting indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for blue text (used for the user label).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for red text (used for the error banner).
const ANSI_RED: &str = "\x1b[31m";

/// Shown while a request is in flight.
pub const WAITING_MESSAGE: &str = "El asistente está respondiendo...";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one turn of the conversation.
    fn print_turn(&mut self, turn: &Turn);

    /// Print the error banner.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print the message waiting to be sent.
    fn print_pending(&mut self, pending: &str);
}

/// Speaker label for a role.
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "Tú",
        Role::Model => "Asistente",
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_turn(&mut self, turn: &Turn) {
        let label = role_label(turn.role);
        if self.use_color {
            let color = match turn.role {
                Role::User => ANSI_BLUE,
                Role::Model => ANSI_CYAN,
            };
            println!("{ANSI_BOLD}{color}{label}:{ANSI_RESET}");
        } else {
            println!("{label}:");
        }
        for line in turn.text().lines() {
            println!("  {line}");
        }
        println!();
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}{error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_pending(&mut self, pending: &str) {
        if pending.is_empty() {
            println!("(no pending message)");
        } else if self.use_color {
            println!("{ANSI_DIM}{pending}{ANSI_RESET}");
        } else {
            println!("{pending}");
        }
        self.flush();
    }
}

/// Prints the waiting message whenever a request goes out.
#[derive(Debug, Clone, Copy)]
pub struct PhaseIndicator {
    use_color: bool,
}

impl PhaseIndicator {
    /// Creates an indicator with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl ChatObserver for PhaseIndicator {
    fn phase_changed(&self, phase: &Phase) {
        if phase.is_sending() {
            if self.use_color {
                eprintln!("{ANSI_DIM}{WAITING_MESSAGE}{ANSI_RESET}");
            } else {
                eprintln!("{WAITING_MESSAGE}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn labels() {
        assert_eq!(role_label(Role::User), "Tú");
        assert_eq!(role_label(Role::Model), "Asistente");
    }
}
