pub mod heuristic;
pub mod llm;

pub use heuristic::HeuristicExtractor;
pub use llm::{LlmConfig, LlmError, LlmExtractor};
