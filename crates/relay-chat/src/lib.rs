#![allow(clippy::must_use_candidate)]

//! Streaming chat relay core
//!
//! Validates an inbound chat request, invokes the upstream completion API in
//! streaming mode, and forwards the response to the caller line by line with
//! line boundaries preserved exactly as received.

mod error;
mod framing;
mod handler;
mod types;
mod upstream;

pub use error::ChatError;
pub use framing::LineBuffer;
pub use handler::{ChatState, chat_router};
pub use types::{ChatMessage, ChatRequest, Role};
pub use upstream::UpstreamClient;
