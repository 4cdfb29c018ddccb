//! Input line parsing for the chat application.
//!
//! Every line the user enters is one Enter key press.  Lines starting with
//! `/` control the session and are never sent to the assistant, unless the
//! first word is a path such as `/var/log/messages` or the line starts with
//! `//`, which sends the rest with a single leading slash.  A line ending in
//! a backslash continues the message on the next line, the terminal's
//! stand-in for shift+Enter.

use crate::controller::{ChatController, SubmitOutcome};
use crate::transport::Transport;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Fold a local text file into the pending message.
    Upload(String),

    /// Send the pending message as it is.
    Send,

    /// Show the pending message.
    Pending,

    /// Throw away the pending message.
    Discard,

    /// Start over from the greeting.
    Clear,

    /// Print the whole conversation.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// What one entered line means.
#[derive(Debug, Clone, PartialEq)]
pub enum InputLine {
    /// Nothing was typed.
    Blank,
    /// A slash command.
    Command(ChatCommand),
    /// Text to add to the pending message, followed by a newline; do not
    /// send yet.
    Continue(String),
    /// Text to add to the pending message, then send.
    Submit(String),
}

/// Classify one entered line.
pub fn parse_line(line: &str) -> InputLine {
    if let Some(escaped) = line.trim_start().strip_prefix("//") {
        return text_line(&format!("/{escaped}"));
    }
    if let Some(command) = parse_command(line) {
        return InputLine::Command(command);
    }
    text_line(line)
}

fn text_line(line: &str) -> InputLine {
    if let Some(text) = line.strip_suffix('\\') {
        return InputLine::Continue(text.to_string());
    }
    if line.trim().is_empty() {
        return InputLine::Blank;
    }
    InputLine::Submit(line.to_string())
}

/// Feed one non-command line to the controller as an Enter key press.
///
/// Typed text is added to the pending message, separated from a pending
/// file block by a blank line.  A blank line sends whatever is pending.
/// Commands are left to the caller and yield [`SubmitOutcome::Ignored`].
pub async fn enter_text<T: Transport>(
    chat: &mut ChatController<T>,
    line: &InputLine,
) -> SubmitOutcome {
    match line {
        InputLine::Blank => chat.on_enter(false).await,
        InputLine::Continue(text) => {
            compose(chat, text);
            chat.on_enter(true).await
        }
        InputLine::Submit(text) => {
            compose(chat, text);
            chat.on_enter(false).await
        }
        InputLine::Command(_) => SubmitOutcome::Ignored,
    }
}

fn compose<T: Transport>(chat: &mut ChatController<T>, text: &str) {
    if !chat.input().is_empty() && !chat.input().ends_with('\n') {
        chat.append_input("\n\n");
    }
    chat.append_input(text);
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as message text.
///
/// # Examples
///
/// ```
/// # use netdoctor::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/upload router.conf").is_some());
/// assert!(parse_command("No puedo hacer ping").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    if command.contains('/') {
        return None;
    }
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "upload" | "file" => match argument {
            Some(path) => ChatCommand::Upload(path.to_string()),
            None => ChatCommand::Invalid("/upload requires a file path".to_string()),
        },
        "send" => ChatCommand::Send,
        "pending" | "show" => ChatCommand::Pending,
        "discard" => ChatCommand::Discard,
        "clear" | "reset" => ChatCommand::Clear,
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /upload <file>         Attach a .txt, .log, .conf or .text file to the pending message
  /send                  Send the pending message as it is
  /pending               Show the pending message
  /discard               Throw away the pending message
  /clear                 Start a new conversation
  /history               Print the whole conversation
  /help                  Show this help message
  /quit                  Exit the chat

Enter on an empty line sends the pending message.
End a line with \ to continue the message on the next line.
Start a line with // to send text that begins with /."#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use url::Url;

    use crate::config::AssistantConfig;
    use crate::error::{Error, Result};
    use crate::ingest::{FILE_END_MARKER, MemoryFile};
    use crate::retry::RetryPolicy;
    use crate::transport::{HttpResponse, RequestOptions};
    use crate::types::Turn;

    #[derive(Default)]
    struct CannedTransport {
        replies: Mutex<VecDeque<HttpResponse>>,
        sent: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, _: &Url, options: &RequestOptions) -> Result<HttpResponse> {
            self.sent
                .lock()
                .unwrap()
                .push(serde_json::from_slice(&options.body).unwrap());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::connection("no reply scripted", None))
        }
    }

    fn chat_with_reply(text: &str) -> (ChatController<Arc<CannedTransport>>, Arc<CannedTransport>) {
        let body = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        });
        let transport = Arc::new(CannedTransport::default());
        transport
            .replies
            .lock()
            .unwrap()
            .push_back(HttpResponse::from_status_code(200, body.to_string()));
        let config = AssistantConfig::new(Url::parse("http://localhost:8787/").unwrap())
            .with_greeting("Hola")
            .with_retry(RetryPolicy::no_retries());
        let chat = ChatController::with_transport(Arc::new(config), Arc::clone(&transport));
        (chat, transport)
    }

    async fn enter(chat: &mut ChatController<Arc<CannedTransport>>, line: &str) -> SubmitOutcome {
        enter_text(chat, &parse_line(line)).await
    }

    #[tokio::test]
    async fn blank_enter_sends_pending_file() {
        let (mut chat, transport) = chat_with_reply("Veo la interfaz apagada.");
        chat.ingest(MemoryFile::new("r1.conf", "text/plain", "interface Gi0/1\n shutdown"))
            .unwrap();

        let outcome = enter(&mut chat, "").await;

        assert!(outcome.is_replied());
        assert!(chat.input().is_empty());
        assert_eq!(chat.turns().len(), 3);
        let sent = chat.turns()[1].text();
        assert!(sent.contains("(r1.conf)"));
        assert!(sent.ends_with(FILE_END_MARKER));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_enter_with_nothing_pending_is_ignored() {
        let (mut chat, transport) = chat_with_reply("no se usa");
        assert!(enter(&mut chat, "   ").await.is_ignored());
        assert_eq!(chat.turns().len(), 1);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn continued_lines_then_blank_enter() {
        let (mut chat, _) = chat_with_reply("ok");
        assert!(enter(&mut chat, "ping 8.8.8.8 falla\\").await.is_ignored());
        assert!(enter(&mut chat, "traceroute corta en el salto 2\\").await.is_ignored());
        assert_eq!(
            chat.input(),
            "ping 8.8.8.8 falla\ntraceroute corta en el salto 2\n"
        );

        assert!(enter(&mut chat, "").await.is_replied());
        assert_eq!(
            chat.turns()[1],
            Turn::user("ping 8.8.8.8 falla\ntraceroute corta en el salto 2\n")
        );
    }

    #[tokio::test]
    async fn question_after_upload_is_separated() {
        let (mut chat, _) = chat_with_reply("ok");
        chat.ingest(MemoryFile::new("a.log", "text/plain", "link down"))
            .unwrap();
        assert!(enter(&mut chat, "¿Qué pasó?").await.is_replied());
        let sent = chat.turns()[1].text();
        assert!(sent.ends_with(&format!("{FILE_END_MARKER}\n\n¿Qué pasó?")));
    }

    #[test]
    fn path_like_slash_text_is_a_message() {
        assert!(parse_command("/var/log/messages muestra errores").is_none());
        assert_eq!(
            parse_line("/var/log/messages muestra errores"),
            InputLine::Submit("/var/log/messages muestra errores".to_string())
        );
    }

    #[test]
    fn double_slash_escapes_commands() {
        assert_eq!(parse_line("//help"), InputLine::Submit("/help".to_string()));
        assert_eq!(
            parse_line("//etc/hosts no resuelve\\"),
            InputLine::Continue("/etc/hosts no resuelve".to_string())
        );
    }

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_upload() {
        assert_eq!(
            parse_command("/upload /var/log/syslog.log"),
            Some(ChatCommand::Upload("/var/log/syslog.log".to_string()))
        );
        assert_eq!(
            parse_command("/file  show run.txt "),
            Some(ChatCommand::Upload("show run.txt".to_string()))
        );
        assert!(matches!(
            parse_command("/upload"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_session_commands() {
        assert_eq!(parse_command("/send"), Some(ChatCommand::Send));
        assert_eq!(parse_command("/pending"), Some(ChatCommand::Pending));
        assert_eq!(parse_command("/discard"), Some(ChatCommand::Discard));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert_eq!(
            parse_command("/model gemini"),
            Some(ChatCommand::Invalid("Unknown command: /model".to_string()))
        );
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(parse_command("ping 8.8.8.8").is_none());
        assert!(parse_command("ruta /24 perdida").is_none());
    }

    #[test]
    fn classify_lines() {
        assert_eq!(parse_line(""), InputLine::Blank);
        assert_eq!(parse_line("   "), InputLine::Blank);
        assert_eq!(parse_line("/send"), InputLine::Command(ChatCommand::Send));
        assert_eq!(
            parse_line("interface Gi0/1 \\"),
            InputLine::Continue("interface Gi0/1 ".to_string())
        );
        assert_eq!(
            parse_line("ping 8.8.8.8"),
            InputLine::Submit("ping 8.8.8.8".to_string())
        );
    }
}
