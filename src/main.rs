use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteqa_cli::{
    Command, Reply, Shell, display_banner, display_error, display_reply, handle_input_with_history,
};
use siteqa_core::Embedder;
use siteqa_openai::{OpenAIClient, OpenAIConfig};
use siteqa_rag::{
    EmbedderKind, HashEmbedder, LocalRAGEngine, RagConfig, SessionContext, WebDocumentLoader,
};
use siteqa_vision::ImageDescriber;

#[derive(Parser)]
#[command(name = "siteqa")]
#[command(about = "Ask questions about a web page or an image", long_about = None)]
struct Cli {
    /// OpenAI API key (overrides OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Web page to load at startup
    #[arg(short, long)]
    url: Option<String>,

    /// Ask this question and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Describe this image (with --question if given) and exit
    #[arg(short, long)]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,siteqa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let openai = OpenAIConfig::from_env_with_key(cli.api_key.clone())
        .context("OpenAI configuration")?;
    let client = Arc::new(OpenAIClient::new(openai)?);
    let rag = RagConfig::from_env().context("retrieval configuration")?;

    let embedder: Arc<dyn Embedder> = match rag.embedder {
        EmbedderKind::OpenAI => client.clone(),
        EmbedderKind::Hash => Arc::new(HashEmbedder::new(rag.hash_dimension)),
    };

    let loader = Arc::new(WebDocumentLoader::new(rag.fetch_timeout())?);
    let engine = Arc::new(LocalRAGEngine::with_config(client.clone(), client.text_config()));
    let session = SessionContext::new(loader, embedder, engine).with_chunking(rag.chunking.clone());
    let describer = ImageDescriber::new(client.clone(), client.vision_config());

    let mut shell = Shell::new(session, describer);

    tracing::info!(
        chat_model = %client.config().chat_model,
        embedder = ?rag.embedder,
        "siteqa starting"
    );

    // one-shot modes
    if let Some(path) = cli.image {
        let reply = shell
            .run(Command::Image {
                path,
                question: cli.question,
            })
            .await?;
        display_reply(&reply);
        return Ok(());
    }

    if let Some(url) = cli.url {
        let reply = shell.run(Command::Load(url)).await?;
        display_reply(&reply);
    }

    if let Some(question) = cli.question {
        let reply = shell.run(Command::Ask(question)).await?;
        display_reply(&reply);
        return Ok(());
    }

    display_banner();

    let mut history = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        match shell.run_line(&input).await {
            Ok(Reply::Exit) => {
                display_reply(&Reply::Exit);
                break;
            }
            Ok(reply) => display_reply(&reply),
            Err(e) => display_error(&e),
        }
    }

    println!("{}", "Session closed".dimmed());
    Ok(())
}
