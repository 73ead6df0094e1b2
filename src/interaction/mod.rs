//! Prompt-driven interaction with the installer
//!
//! This module recognizes prompt boundaries in the installer's output,
//! resolves canned answers and feeds them back on stdin.

pub mod answers;
pub mod engine;
pub mod prompt;

// Re-exports for convenience
pub use answers::{AnswerTable, Resolution, DEFAULT_FALLBACK_ANSWER};
pub use engine::{InteractionEngine, PromptExchange, Transcript};
pub use prompt::{candidate_line, extract_label, is_prompt_line, Prompt, PROMPT_TERMINATOR};
