//! Terminal front end for the troubleshooting assistant.
//!
//! This module provides the pieces the `netdoctor-chat` binary is built
//! from:
//!
//! - [`config`]: CLI argument parsing and configuration resolution
//! - [`commands`]: slash commands and line classification
//! - [`render`]: terminal output and the waiting indicator

mod commands;
mod config;
mod render;

pub use commands::{
    ChatCommand, InputLine, enter_text, help_text, parse_command, parse_line,
};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PhaseIndicator, PlainTextRenderer, Renderer, WAITING_MESSAGE, role_label};
