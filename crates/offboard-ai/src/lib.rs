//! Language-model client surface for the offboard service.
//!
//! Exposes the provider-neutral [`LlmClient`] contract plus the Gemini
//! `generateContent` client used for intent extraction and summaries.
mod google;
mod types;

pub use google::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
pub use types::{AiError, ChatRequest, ChatResponse, ChatUsage, LlmClient, Message, MessageRole};
