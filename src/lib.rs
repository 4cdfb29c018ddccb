// Public modules
pub mod chat;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod ingest;
pub mod observability;
pub mod observer;
pub mod retry;
pub mod transport;
pub mod types;

// Re-exports
pub use config::AssistantConfig;
pub use controller::{ChatController, Phase, SubmitOutcome, UiState, interpret_response};
pub use conversation::ConversationStore;
pub use error::{Error, Result};
pub use ingest::{LocalFile, MemoryFile, SelectedFile};
pub use observability::register_biometrics;
pub use observer::ChatObserver;
pub use retry::{RetryPolicy, RetryingClient};
pub use transport::{HttpResponse, RequestOptions, ReqwestTransport, Transport};
pub use types::*;
