//! Sheetlift Domain Layer
//!
//! Core vocabulary shared by every other sheetlift crate. Nothing in here
//! performs I/O; it only describes what a completion request looks like, what
//! comes back, and the trait a provider implements to answer one.
//!
//! ## Key Concepts
//!
//! - **CompletionRequest**: one single-turn prompt plus sampling parameters
//! - **RawResponse**: the provider's verbatim answer, or its failure status
//! - **CompletionProvider**: the injectable remote call
//!
//! ## Architecture
//!
//! - No network or filesystem access
//! - Provider implementations live in `sheetlift-llm`
//! - The extraction pipeline in `sheetlift-extractor` depends only on the trait

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod traits;

// Re-exports for convenience
pub use completion::{
    CompletionRequest, Message, RawResponse, ResultFormat, Role, SamplingParams,
};
pub use traits::CompletionProvider;
