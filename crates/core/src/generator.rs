//! Outline generator abstraction.

use serde_json::Value;

use crate::error::Result;
use crate::types::DocumentTree;

/// An external service that proposes a slide outline for a document.
///
/// Implementations return the service's raw structured output; it is
/// untrusted and must go through [`crate::outline::normalize`] before any
/// downstream component sees it. The call is blocking and is not retried.
pub trait OutlineGenerator {
    /// Propose an outline for the given document tree.
    fn generate(&self, document: &DocumentTree) -> Result<Value>;
}
