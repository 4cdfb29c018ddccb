//! The chat state machine.
//!
//! [`ChatController`] owns the conversation, the input buffer and the
//! request lifecycle:
//!
//! ```text
//! Idle ──submit──▶ Sending ──reply──▶ Idle
//!   ▲                 │
//!   │                 └──failure──▶ Error ──submit──▶ Sending
//!   └────reset──────────────────────────┘
//! ```
//!
//! A submission holds `&mut self` from the optimistic append of the user's
//! turn until the reply (or the final failure) arrives, so two submissions
//! can never overlap.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AssistantConfig;
use crate::conversation::ConversationStore;
use crate::error::{Error, Result};
use crate::ingest::{self, LocalFile, SelectedFile};
use crate::observability::{CHAT_ERRORS, CHAT_REPLIES, CHAT_SUBMISSIONS};
use crate::observer::ChatObserver;
use crate::retry::RetryingClient;
use crate::transport::{HttpResponse, ReqwestTransport, RequestOptions, Transport};
use crate::types::{GenerateRequest, GenerateResponse, Turn};

/// Where the controller is in its request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for input.
    #[default]
    Idle,
    /// A request (including its retries) is in flight.
    Sending,
    /// The last action failed; holds the banner text shown to the user.
    Error(String),
}

impl Phase {
    /// Returns true when waiting for input with no error showing.
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// Returns true while a request is in flight.
    pub fn is_sending(&self) -> bool {
        matches!(self, Phase::Sending)
    }

    /// Returns true when an error banner is showing.
    pub fn is_error(&self) -> bool {
        matches!(self, Phase::Error(_))
    }

    /// The banner text, if an error is showing.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Snapshot of the transient state a front end renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Text waiting to be sent.
    pub input: String,
    /// True only while a request is in flight.
    pub loading: bool,
    /// Banner text for the last failure, if any.
    pub error: Option<String>,
}

/// What a call to [`ChatController::submit`] did.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Nothing was sent: the input was blank or a request was in flight.
    Ignored,
    /// The assistant answered; the reply is now the last turn.
    Replied(Turn),
    /// The exchange failed; the user's turn stays in the conversation.
    Failed(Error),
}

impl SubmitOutcome {
    /// Returns true if nothing was sent.
    pub fn is_ignored(&self) -> bool {
        matches!(self, SubmitOutcome::Ignored)
    }

    /// Returns true if the assistant answered.
    pub fn is_replied(&self) -> bool {
        matches!(self, SubmitOutcome::Replied(_))
    }

    /// Returns true if the exchange failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, SubmitOutcome::Failed(_))
    }
}

/// Banner shown when an exchange with the assistant fails.
pub fn exchange_error_banner(err: &Error) -> String {
    let detail = exchange_error_detail(err);
    format!("Error al contactar al asistente. (Detalle: {detail}). Por favor, intenta de nuevo.")
}

/// The user-facing detail for a failed exchange.  `Display` on [`Error`]
/// stays in English for the logs.
pub fn exchange_error_detail(err: &Error) -> String {
    match err {
        Error::Http {
            status_code,
            status_text,
            message,
        } => {
            let status_text = status_text.as_deref().unwrap_or("estado desconocido");
            match message {
                Some(message) => {
                    format!("Error de API: {status_text} (Status: {status_code}): {message}")
                }
                None => format!("Error de API: {status_text} (Status: {status_code})"),
            }
        }
        Error::Api { message } => format!("Error de la API de Google: {message}"),
        Error::EmptyResponse => "Respuesta de API inesperada o vacía.".to_string(),
        Error::Timeout { .. } => "Tiempo de espera agotado al contactar al servidor".to_string(),
        Error::Connection { .. } => "No se pudo conectar con el servidor".to_string(),
        Error::HttpClient { .. } => "La solicitud no se pudo completar".to_string(),
        Error::Serialization { .. } => "Respuesta de API con formato no válido".to_string(),
        other => other.to_string(),
    }
}

/// Banner shown when an upload is rejected.
pub fn ingest_error_banner(err: &Error) -> String {
    match err {
        Error::UnsupportedFileType { .. } => {
            "Por favor, sube solo archivos de texto (.txt, .log, .conf).".to_string()
        }
        Error::FileRead { name, .. } => format!("Error al leer el archivo ({name})."),
        other => format!("Error al procesar el archivo: {other}"),
    }
}

/// Decide what a terminal response means for the conversation.
///
/// A success status with at least one candidate yields the first
/// candidate's turn.  Everything else is an error: a non-success status
/// (with the body's error message when it has one), an `error` object in
/// place of candidates, or a body with neither.
pub fn interpret_response(response: &HttpResponse) -> Result<Turn> {
    if !response.is_success() {
        let message = response
            .json::<GenerateResponse>()
            .ok()
            .and_then(|body| body.error_message().map(String::from))
            .filter(|message| !message.is_empty());
        return Err(Error::http(
            response.status().as_u16(),
            response.status_text().map(String::from),
            message,
        ));
    }

    let body = response.json::<GenerateResponse>()?;
    let error = body.error_message().map(String::from);
    if let Some(reason) = body.finish_reason() {
        tracing::debug!(finish_reason = reason, "first candidate finished");
    }
    if let Some(turn) = body.into_first_turn() {
        return Ok(turn);
    }
    match error {
        Some(message) => Err(Error::api(message)),
        None => Err(Error::empty_response()),
    }
}

/// Orchestrates input, conversation and network calls.
pub struct ChatController<T: Transport> {
    config: Arc<AssistantConfig>,
    client: RetryingClient<T>,
    store: ConversationStore,
    phase: Phase,
    input: String,
    observers: Vec<Arc<dyn ChatObserver>>,
}

impl ChatController<ReqwestTransport> {
    /// Creates a controller that talks to the configured endpoint over HTTP.
    pub fn new(config: Arc<AssistantConfig>) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ChatController<T> {
    /// Creates a controller on top of a custom transport.
    pub fn with_transport(config: Arc<AssistantConfig>, transport: T) -> Self {
        let client = RetryingClient::new(transport, config.retry);
        let store = ConversationStore::with_greeting(config.greeting_turn());
        Self {
            config,
            client,
            store,
            phase: Phase::Idle,
            input: String::new(),
            observers: Vec::new(),
        }
    }

    /// Adds an observer.
    pub fn with_observer(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The shared configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// The retrying client used for every exchange.
    pub fn client(&self) -> &RetryingClient<T> {
        &self.client
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &ConversationStore {
        &self.store
    }

    /// The conversation's turns in display order.
    pub fn turns(&self) -> &[Turn] {
        self.store.turns()
    }

    /// The current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase.is_sending()
    }

    /// The banner text for the last failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.phase.error_message()
    }

    /// The input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Appends text to the input buffer.
    pub fn append_input(&mut self, text: &str) {
        self.input.push_str(text);
    }

    /// Empties the input buffer.
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Snapshot of the transient state for rendering.
    pub fn ui_state(&self) -> UiState {
        UiState {
            input: self.input.clone(),
            loading: self.is_loading(),
            error: self.last_error().map(String::from),
        }
    }

    /// Handle an Enter key press.
    ///
    /// Without shift this submits, unless a request is in flight.  With
    /// shift it inserts a newline into the input buffer.
    pub async fn on_enter(&mut self, shift: bool) -> SubmitOutcome {
        if shift {
            self.input.push('\n');
            return SubmitOutcome::Ignored;
        }
        if self.is_loading() {
            return SubmitOutcome::Ignored;
        }
        self.submit().await
    }

    /// Replace the input buffer with `text` and submit it.
    ///
    /// Blank text is ignored and leaves the input buffer as it was.
    pub async fn submit_text(&mut self, text: impl Into<String>) -> SubmitOutcome {
        let text = text.into();
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        self.input = text;
        self.submit().await
    }

    /// Submit the input buffer.
    ///
    /// The user's turn is appended before the request goes out and is kept
    /// even if the exchange fails.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.input.trim().is_empty() || self.is_loading() {
            return SubmitOutcome::Ignored;
        }
        CHAT_SUBMISSIONS.click();
        self.set_phase(Phase::Sending);
        let text = std::mem::take(&mut self.input);
        self.append(Turn::user(text));
        tracing::debug!(turns = self.store.len(), "submitting conversation");

        match self.exchange().await {
            Ok(turn) => {
                CHAT_REPLIES.click();
                self.append(turn.clone());
                self.set_phase(Phase::Idle);
                SubmitOutcome::Replied(turn)
            }
            Err(err) => {
                CHAT_ERRORS.click();
                tracing::warn!(error = %err, "exchange with assistant failed");
                self.set_phase(Phase::Error(exchange_error_banner(&err)));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Fold a file into the input buffer.
    ///
    /// On failure the banner is set and the input buffer and conversation
    /// are untouched.  On success any previous banner is cleared.
    pub fn ingest<F: SelectedFile>(&mut self, file: F) -> Result<()> {
        match ingest::ingest(file, &mut self.input) {
            Ok(()) => {
                if self.phase.is_error() {
                    self.set_phase(Phase::Idle);
                }
                Ok(())
            }
            Err(err) => self.reject_upload(err),
        }
    }

    /// Pick the local file at `path` and fold it into the input buffer.
    ///
    /// Paths outside [`ingest::ACCEPTED_EXTENSIONS`] are refused before
    /// anything is read, with the same banner as a non-text media type.
    pub fn upload(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        match LocalFile::pick(path) {
            Ok(file) => self.ingest(file),
            Err(err) => self.reject_upload(err),
        }
    }

    fn reject_upload(&mut self, err: Error) -> Result<()> {
        if !self.is_loading() {
            self.set_phase(Phase::Error(ingest_error_banner(&err)));
        }
        Err(err)
    }

    /// Start over: the conversation returns to the greeting, input and
    /// banner are cleared.
    pub fn reset(&mut self) {
        self.store.reset();
        self.input.clear();
        self.set_phase(Phase::Idle);
    }

    async fn exchange(&self) -> Result<Turn> {
        let request = GenerateRequest::new(self.store.snapshot(), self.config.system_instruction());
        self.notify(|observer| observer.request_built(&request));
        let options = RequestOptions::post_json(&request)?;
        let response = self.client.send(&self.config.endpoint, &options).await?;
        self.notify(|observer| observer.response_received(&response));
        interpret_response(&response)
    }

    fn append(&mut self, turn: Turn) {
        self.store.push(turn);
        if let Some(turn) = self.store.last() {
            self.notify(|observer| observer.turn_appended(turn));
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.notify(|observer| observer.phase_changed(&self.phase));
        }
    }

    fn notify<F: Fn(&dyn ChatObserver)>(&self, f: F) {
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }
}
