use anyhow::Result;
use archassist_ai_embed::{EmbedConfig, provider_from_config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // EMBEDDING_MODE=live with OPENAI_API_KEY set uses the remote service
    let config = EmbedConfig::from_env()?;
    let provider = provider_from_config(&config)?;

    let texts = vec![
        "Minimum ceiling height for habitable rooms is 2.4 m.".to_string(),
        "Cross-laminated timber panels reduce embodied carbon.".to_string(),
        "Corridors serving as exit routes must be at least 1.1 m wide.".to_string(),
    ];

    println!(
        "Embedding {} texts with the {} provider",
        texts.len(),
        provider.provider_name()
    );
    let result = provider.embed_texts(&texts).await?;

    for (text, embedding) in texts.iter().zip(&result.embeddings) {
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        println!("{:>8.3}  {}", norm, text);
    }
    println!("Dimension: {}", result.dimension);

    Ok(())
}
