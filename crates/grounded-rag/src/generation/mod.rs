//! Grounded answer generation over retrieved context

mod engine;
mod prompt;

pub use engine::QueryEngine;
pub use prompt::PromptBuilder;
