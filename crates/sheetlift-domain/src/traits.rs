//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction pipeline and the
//! remote model. Implementations live in `sheetlift-llm`.

use crate::completion::{CompletionRequest, RawResponse};

/// A remote single-turn text completion service
///
/// `Ok(RawResponse::Failure { .. })` means the provider answered with a
/// non-success status; `Err` means no answer was obtained at all (transport
/// failure, undecodable envelope).
///
/// Implemented by the infrastructure layer (sheetlift-llm)
pub trait CompletionProvider {
    /// Error type for transport-level failures
    type Error: std::fmt::Display;

    /// Send `request` and block until the provider answers
    fn complete(&self, request: &CompletionRequest) -> Result<RawResponse, Self::Error>;

    /// Short provider name used in log lines
    fn name(&self) -> &str;
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for &P {
    type Error = P::Error;

    fn complete(&self, request: &CompletionRequest) -> Result<RawResponse, Self::Error> {
        (**self).complete(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for Box<P> {
    type Error = P::Error;

    fn complete(&self, request: &CompletionRequest) -> Result<RawResponse, Self::Error> {
        (**self).complete(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
