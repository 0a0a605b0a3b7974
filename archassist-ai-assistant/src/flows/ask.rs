use super::diagnostic;
use crate::Assistant;
use crate::prompts::ASK_SYSTEM_PROMPT;
use serde::Serialize;
use tracing::{info, warn};

/// Answer returned when the generator itself failed.
pub const ASK_UNAVAILABLE: &str =
    "The assistant could not generate an answer right now. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Assistant {
    /// Answer a free-form question from the ingested documents.
    pub async fn ask(&self, query: &str) -> AskResponse {
        info!("Answering question ({} chars)", query.len());
        let mut diagnostics = Vec::new();
        let context = self.grounding(query, &mut diagnostics).await;

        let answer = match self
            .generator
            .generate(query, &context, ASK_SYSTEM_PROMPT)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                diagnostics.push(format!("generation: {e}"));
                ASK_UNAVAILABLE.to_string()
            }
        };

        AskResponse {
            answer,
            diagnostic: diagnostic(diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::*;
    use crate::generate::MockGenerator;
    use archassist_ai_retriever::retrieval::Retriever;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_ask_grounded_in_documents() {
        let temp_dir = tempdir().unwrap();
        let assistant = mock_assistant(&temp_dir, &["Stairs need handrails on both sides."]).await;

        let response = assistant.ask("Stairs need handrails on both sides.").await;
        assert!(response.answer.starts_with("[MOCK LLM RESPONSE]"));
        assert!(response.answer.contains("Context:\nStairs need handrails on both sides."));
        assert_eq!(response.diagnostic, None);
    }

    #[tokio::test]
    async fn test_ask_without_ingestion() {
        let temp_dir = tempdir().unwrap();
        let assistant = mock_assistant(&temp_dir, &[]).await;

        let response = assistant.ask("What is a lintel?").await;
        assert_eq!(
            response.answer,
            "[MOCK LLM RESPONSE]\n\nQuestion:\nWhat is a lintel?\n\nContext:\n"
        );
        assert_eq!(response.diagnostic, None);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_ask_survives_embedding_failure() {
        let temp_dir = tempdir().unwrap();
        let assistant = crate::Assistant::new(
            Retriever::new(store_in(&temp_dir), Arc::new(FailingEmbedder)),
            Arc::new(MockGenerator),
        );

        let response = assistant.ask("Roof pitch?").await;
        assert!(response.answer.contains("Question:\nRoof pitch?"));
        let diagnostic = response.diagnostic.unwrap();
        assert!(diagnostic.starts_with("retrieval:"));
        assert!(diagnostic.contains("invalid key"));
        assert!(logs_contain("Retrieval failed"));
    }

    #[tokio::test]
    async fn test_ask_survives_generation_failure() {
        let temp_dir = tempdir().unwrap();
        let assistant = assistant_with_docs(&temp_dir, &["doc"], Arc::new(FailingGenerator)).await;

        let response = assistant.ask("anything").await;
        assert_eq!(response.answer, ASK_UNAVAILABLE);
        assert!(response.diagnostic.unwrap().contains("HTTP 503"));
    }

    #[test]
    fn test_diagnostic_omitted_from_json() {
        let response = AskResponse {
            answer: "ok".to_string(),
            diagnostic: None,
        };
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"answer":"ok"}"#);
    }
}
