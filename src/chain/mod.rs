//! Retrieval-augmented question answering chain

pub mod prompt;
pub mod retrieval;

pub use prompt::PromptBuilder;
pub use retrieval::{ChainAnswer, RetrievalChain};
