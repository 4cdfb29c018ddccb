//! Command-line configuration for the chat front end.
//!
//! This module provides CLI argument parsing via `arrrg` and resolves the
//! flags, an optional YAML file, and the compiled-in defaults into one
//! [`ChatConfig`].

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::config::{AssistantConfig, parse_endpoint};
use crate::error::Result;

/// Command-line arguments for the netdoctor-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "PATH")]
    pub config: Option<String>,

    /// Endpoint override.
    #[arrrg(optional, "Assistant endpoint URL", "URL")]
    pub endpoint: Option<String>,

    /// Retries on rate limiting or network failure.
    #[arrrg(optional, "Retries on 429 or network failure (default: 3)", "N")]
    pub max_retries: Option<u32>,

    /// Wait before the first retry.
    #[arrrg(optional, "Wait before the first retry in ms (default: 1000)", "MS")]
    pub initial_delay_ms: Option<u64>,

    /// Per-attempt timeout.
    #[arrrg(optional, "Per-attempt timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved configuration for the chat front end.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Static assistant configuration handed to the controller.
    pub assistant: AssistantConfig,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a ChatConfig from the compiled-in defaults.
    pub fn new() -> Result<Self> {
        Ok(Self {
            assistant: AssistantConfig::from_defaults()?,
            use_color: true,
        })
    }

    /// Resolves command-line arguments.  Flags override the configuration
    /// file, which overrides the defaults.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        let mut assistant = match &args.config {
            Some(path) => AssistantConfig::from_file(path)?,
            None => AssistantConfig::from_defaults()?,
        };
        if let Some(endpoint) = &args.endpoint {
            assistant.endpoint = parse_endpoint(endpoint)?;
        }
        if let Some(max_retries) = args.max_retries {
            assistant.retry.max_retries = max_retries;
        }
        if let Some(ms) = args.initial_delay_ms {
            assistant.retry.initial_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = args.timeout_secs {
            assistant.timeout = Duration::from_secs(secs);
        }
        assistant.validate()?;
        Ok(Self {
            assistant,
            use_color: !args.no_color,
        })
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}
