//! Consolidation engine: classification, pair matching, validation and summary

pub mod aggregator;
pub mod classifier;
pub mod core;
pub mod elimination;
pub mod pipeline;
pub mod summarizer;
pub mod validator;

pub use aggregator::*;
pub use classifier::*;
pub use self::core::*;
pub use elimination::*;
pub use pipeline::*;
pub use summarizer::*;
pub use validator::*;
