use anyhow::Result;
use archassist_ai_assistant::{Assistant, DesignRequest, config::AssistantConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Defaults plus LLM_MODE, EMBEDDING_MODE, OPENAI_API_KEY and ARCHASSIST_DATA_DIR
    let config = AssistantConfig::load(None)?;
    let assistant = Assistant::from_config(&config)?;

    let answer = assistant.ask("How wide must an accessible door be?").await;
    println!("{}", serde_json::to_string_pretty(&answer)?);

    let design = assistant
        .design(&DesignRequest::new("Single-storey community library with a reading garden"))
        .await;
    println!("{}", serde_json::to_string_pretty(&design)?);

    Ok(())
}
