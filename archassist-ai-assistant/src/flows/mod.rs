//! Ask, design and compliance flows
//!
//! Every flow degrades instead of failing. Failures are logged at `warn` and
//! collected into the response's `diagnostic` field.

pub mod ask;
pub mod compliance;
pub mod design;

pub use ask::AskResponse;
pub use compliance::{ComplianceReport, ComplianceStatus};
pub use design::{DesignRequest, DesignResponse};

use crate::Assistant;
use tracing::warn;

impl Assistant {
    /// Retrieved context for `query`, or an empty string if retrieval failed.
    async fn grounding(&self, query: &str, diagnostics: &mut Vec<String>) -> String {
        match self.retriever.try_retrieve_context(query).await {
            Ok(context) => context,
            Err(e) => {
                warn!("Retrieval failed, generating without context: {}", e);
                diagnostics.push(format!("retrieval: {e}"));
                String::new()
            }
        }
    }
}

fn diagnostic(diagnostics: Vec<String>) -> Option<String> {
    if diagnostics.is_empty() {
        None
    } else {
        Some(diagnostics.join("; "))
    }
}
