//! Mermaid source sanitizer.
//!
//! Turns free-form model output into a diagram definition a Mermaid renderer
//! can parse:
//!
//! 1. [`fence::strip_fence`] unwraps an optional markdown code fence.
//! 2. [`extract::extract`] keeps the header line and the syntax lines after
//!    it, dropping leading and trailing commentary.
//! 3. [`quote::quote_labels`] quotes multi-word node labels.
//!
//! Every stage falls back to passing its input through, so [`sanitize`]
//! never fails. It is pure and idempotent.

pub mod classify;
pub mod extract;
pub mod fence;
pub mod kind;
pub mod quote;

pub use extract::Extraction;
pub use kind::DiagramKind;

/// Sanitize raw generated text into Mermaid source.
///
/// Text without a recognised header is returned trimmed, with labels quoted.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let unfenced = fence::strip_fence(raw);
    let extraction = extract::extract(unfenced);
    quote::quote_labels(&extraction.source)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
