use anyhow::Result;
use async_openai::Client as OpenAIClient;
use clap::Parser;
use ollama_rs::Ollama;
use std::env;
use tracing::info;

use quill::api::{serve, AppState};
use quill::logging::configure_logging;
use quill::{LLMClient, LLMParams};

#[derive(Parser)]
#[command(name = "quill", about = "Copy editing and date detection over an LLM backend")]
struct Args {
    /// Address to bind the API server on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on; falls back to the PORT environment variable
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let args = Args::parse();

    // Prefer OpenAI when an API key is configured, otherwise talk to a
    // local Ollama instance.
    let llm_client = if env::var("OPENAI_API_KEY").is_ok() {
        info!("Using the OpenAI completion backend");
        LLMClient::OpenAI(OpenAIClient::new())
    } else {
        let ollama_host = env::var("OLLAMA_HOST").unwrap_or("http://localhost".to_string());
        let ollama_port: u16 = env::var("OLLAMA_PORT")
            .unwrap_or("11434".to_string())
            .parse()
            .unwrap_or(11434);
        info!("Connecting to Ollama at {}:{}", ollama_host, ollama_port);
        LLMClient::Ollama(Ollama::new(ollama_host, ollama_port))
    };

    let model = match &llm_client {
        LLMClient::OpenAI(_) => env::var("OPENAI_MODEL").unwrap_or("gpt-4o-mini".to_string()),
        LLMClient::Ollama(_) => env::var("OLLAMA_MODEL").unwrap_or("llama2".to_string()),
    };

    // Read temperature from the environment variable, default to 0.0
    let temperature: f32 = env::var("LLM_TEMPERATURE")
        .unwrap_or("0.0".to_string())
        .parse()
        .unwrap_or(0.0);

    let port = args
        .port
        .or_else(|| env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(8080);

    let state = AppState {
        llm_params: LLMParams {
            llm_client,
            model,
            temperature,
        },
    };

    serve(state, &args.host, port).await
}
