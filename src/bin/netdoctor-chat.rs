//! Interactive terminal chat with the network troubleshooting assistant.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the compiled-in endpoint
//! netdoctor-chat
//!
//! # Point at a local proxy with a shorter retry schedule
//! netdoctor-chat --endpoint http://127.0.0.1:8787/ --initial-delay-ms 250
//!
//! # Read endpoint, prompt and retry settings from a file
//! netdoctor-chat --config netdoctor.yaml
//! ```
//!
//! # Commands
//!
//! - `/upload <file>` - Attach a text file to the pending message
//! - `/send` - Send the pending message
//! - `/clear` - Start over from the greeting
//! - `/help` - Show all commands
//! - `/quit` - Exit the application
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `warn`).

use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use netdoctor::chat::{
    ChatArgs, ChatCommand, ChatConfig, InputLine, PhaseIndicator, PlainTextRenderer, Renderer,
    enter_text, help_text, parse_line,
};
use netdoctor::{ChatController, ReqwestTransport, SubmitOutcome};

/// Main entry point for the netdoctor-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("netdoctor-chat [OPTIONS]");
    let config = ChatConfig::from_args(args)?;
    let use_color = config.use_color;
    let assistant = Arc::new(config.assistant);
    tracing::info!(endpoint = %assistant.endpoint, "starting chat");

    let mut chat = ChatController::new(Arc::clone(&assistant))?
        .with_observer(Arc::new(PhaseIndicator::with_color(use_color)));
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Net-Troubleshooter ({})", assistant.endpoint);
    println!("Type /help for commands, /quit to exit\n");
    print_history(&chat, &mut renderer);

    loop {
        let prompt = if chat.input().is_empty() { "Tú: " } else { "...: " };
        let readline = rl.readline(prompt);

        match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match parse_line(&line) {
                    InputLine::Command(cmd) => match cmd {
                        ChatCommand::Quit => {
                            println!("¡Hasta luego!");
                            break;
                        }
                        ChatCommand::Upload(path) => match chat.upload(&path) {
                            Ok(()) => renderer.print_info(&format!(
                                "Archivo añadido al mensaje pendiente: {path}"
                            )),
                            Err(_) => {
                                if let Some(banner) = chat.last_error() {
                                    renderer.print_error(banner);
                                }
                            }
                        },
                        ChatCommand::Send => {
                            let outcome = chat.submit().await;
                            if outcome.is_ignored() {
                                renderer.print_info("No hay ningún mensaje pendiente.");
                            }
                            report(&chat, outcome, &mut renderer);
                        }
                        ChatCommand::Pending => renderer.print_pending(chat.input()),
                        ChatCommand::Discard => {
                            chat.clear_input();
                            renderer.print_info("Mensaje pendiente descartado.");
                        }
                        ChatCommand::Clear => {
                            chat.reset();
                            renderer.print_info("Conversación reiniciada.\n");
                            print_history(&chat, &mut renderer);
                        }
                        ChatCommand::History => print_history(&chat, &mut renderer),
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => renderer.print_error(&message),
                    },
                    text => {
                        let outcome = enter_text(&mut chat, &text).await;
                        report(&chat, outcome, &mut renderer);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt drops the pending message.
                chat.clear_input();
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\n¡Hasta luego!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn report(
    chat: &ChatController<ReqwestTransport>,
    outcome: SubmitOutcome,
    renderer: &mut PlainTextRenderer,
) {
    match outcome {
        SubmitOutcome::Replied(turn) => renderer.print_turn(&turn),
        SubmitOutcome::Failed(_) => {
            if let Some(banner) = chat.last_error() {
                renderer.print_error(banner);
            }
        }
        SubmitOutcome::Ignored => {}
    }
}

fn print_history(chat: &ChatController<ReqwestTransport>, renderer: &mut PlainTextRenderer) {
    for turn in chat.turns() {
        renderer.print_turn(turn);
    }
}
