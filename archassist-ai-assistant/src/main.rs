use anyhow::Result;
use archassist_ai_assistant::{Assistant, DesignRequest, config::AssistantConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("archassist-ai-assistant")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Architecture assistant: retrieval-augmented answers, designs and compliance reviews")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the ingested store")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("ask")
                .about("Answer a question from the ingested documents")
                .arg(Arg::new("query").required(true)),
        )
        .subcommand(
            Command::new("design")
                .about("Generate a design concept and compliance review for a brief")
                .arg(Arg::new("brief").required(true))
                .arg(
                    Arg::new("sketch")
                        .long("sketch")
                        .value_name("DATA")
                        .help("Sketch payload; its presence asks the model to use it"),
                ),
        )
        .subcommand(
            Command::new("compliance")
                .about("Review a design description against building codes")
                .arg(Arg::new("design").required(true)),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print single-line JSON"),
        )
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{output}");
    Ok(())
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing argument: {name}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    let mut config = AssistantConfig::load(matches.get_one::<PathBuf>("config").map(|p| p.as_path()))?;
    if let Some(data_dir) = matches.get_one::<PathBuf>("data-dir") {
        config.retriever.data_dir = data_dir.clone();
    }
    let compact = matches.get_flag("compact");

    let assistant = Assistant::from_config(&config)?;

    match matches.subcommand() {
        Some(("ask", sub)) => {
            let response = assistant.ask(&required(sub, "query")?).await;
            print_json(&response, compact)
        }
        Some(("design", sub)) => {
            let mut request = DesignRequest::new(required(sub, "brief")?);
            request.sketch = sub.get_one::<String>("sketch").cloned();
            let response = assistant.design(&request).await;
            print_json(&response, compact)
        }
        Some(("compliance", sub)) => {
            let report = assistant.check_compliance(&required(sub, "design")?).await;
            print_json(&report, compact)
        }
        _ => Err(anyhow::anyhow!("Unknown command")),
    }
}
