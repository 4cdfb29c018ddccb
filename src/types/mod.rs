// Public modules
pub mod generate_request;
pub mod generate_response;
pub mod turn;

// Re-exports
pub use generate_request::{GenerateRequest, SystemInstruction};
pub use generate_response::{Candidate, ErrorObject, GenerateResponse};
pub use turn::{Part, Role, Turn};
