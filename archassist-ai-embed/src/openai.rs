//! Remote embeddings through an OpenAI-compatible `/embeddings` endpoint.

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use crate::mock::mock_embedding;
use crate::provider::{Embedding, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Provider calling a remote embedding service.
///
/// A `429 Too Many Requests` answer is not an error: the provider logs it and
/// returns the mock embedding for the same text, so ingestion and queries keep
/// working while the account is throttled.
#[derive(Clone)]
pub struct OpenAiEmbedProvider {
    config: EmbedConfig,
    client: Client,
}

impl std::fmt::Debug for OpenAiEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedProvider")
            .field("model", &self.config.model_name)
            .field("endpoint", &self.config.embeddings_url())
            .field("dimension", &self.config.dimension)
            .finish()
    }
}

impl OpenAiEmbedProvider {
    /// Create a provider with an HTTP client bounded by the configured timeout.
    pub fn new(config: EmbedConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| EmbedError::invalid_config("No API key configured"))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedProvider {
    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        let url = self.config.embeddings_url();
        tracing::debug!("Requesting embedding from {} ({} bytes)", url, text.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(&EmbeddingRequest {
                model: &self.config.model_name,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Embedding service rate limited the request, using mock embedding");
            return Ok(mock_embedding(text, self.config.dimension));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("Embedding service returned {}: {}", status, message);
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::malformed(e.to_string()))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbedError::malformed("response contained no embeddings"))?;

        if embedding.len() != self.config.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.config.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn embedding_dimension(&self) -> usize {
        self.config.dimension
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer exactly one HTTP request with the given status and body.
    /// The join handle yields the raw request text.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{addr}/v1"), handle)
    }

    fn provider_for(api_base: &str, dimension: usize) -> OpenAiEmbedProvider {
        let config = EmbedConfig::live("sk-test")
            .with_api_base(api_base)
            .with_dimension(dimension)
            .with_timeout_secs(5);
        OpenAiEmbedProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_successful_embedding() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.25,0.5,0.75]}],"model":"text-embedding-3-small"}"#;
        let (base, server) = serve_once("200 OK", body.to_string()).await;

        let provider = provider_for(&base, 3);
        let embedding = provider.embed_text("load-bearing walls").await.unwrap();
        assert_eq!(embedding, vec![0.25, 0.5, 0.75]);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/embeddings"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""model":"text-embedding-3-small""#));
        assert!(request.contains(r#""input":"load-bearing walls""#));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_rate_limit_falls_back_to_mock() {
        let (base, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error":{"message":"Rate limit reached"}}"#.to_string(),
        )
        .await;

        let provider = provider_for(&base, 32);
        let embedding = provider.embed_text("daylighting").await.unwrap();
        assert_eq!(embedding, mock_embedding("daylighting", 32));
        assert!(logs_contain("rate limited"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_fatal() {
        let (base, server) = serve_once(
            "500 Internal Server Error",
            r#"{"error":"overloaded"}"#.to_string(),
        )
        .await;

        let provider = provider_for(&base, 3);
        let err = provider.embed_text("stairs").await.unwrap_err();
        match err {
            EmbedError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_is_fatal() {
        let (base, server) = serve_once("401 Unauthorized", "{}".to_string()).await;

        let provider = provider_for(&base, 3);
        let err = provider.embed_text("roof").await.unwrap_err();
        assert!(matches!(err, EmbedError::Api { status: 401, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_dimension_rejected() {
        let body = r#"{"data":[{"embedding":[1.0,2.0]}]}"#;
        let (base, server) = serve_once("200 OK", body.to_string()).await;

        let provider = provider_for(&base, 3);
        let err = provider.embed_text("beam").await.unwrap_err();
        assert!(matches!(
            err,
            EmbedError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_data_is_malformed() {
        let (base, server) = serve_once("200 OK", r#"{"data":[]}"#.to_string()).await;

        let provider = provider_for(&base, 3);
        let err = provider.embed_text("column").await.unwrap_err();
        assert!(matches!(err, EmbedError::MalformedResponse { .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = provider_for(&format!("http://{addr}/v1"), 3);
        let err = provider.embed_text("slab").await.unwrap_err();
        assert!(matches!(err, EmbedError::Transport { .. }));
        assert!(err.is_upstream());
    }
}
