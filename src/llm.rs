use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client as OpenAIClient;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::Ollama;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::message::{Message, Role};
use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

/// Sends a transcript to the configured completion backend and returns the
/// completion text. Retries up to 3 times with exponential backoff; returns
/// `None` once retries are exhausted or the backend produced an empty
/// completion. Callers degrade on `None` instead of failing the request.
pub async fn generate_llm_response(transcript: &[Message], params: &LLMParams) -> Option<String> {
    let max_retries = 3;
    let mut response_text = String::new();
    let mut backoff = 2;

    debug!(target: TARGET_LLM_REQUEST, "Requesting completion from model {} ({} messages)", params.model, transcript.len());

    for retry_count in 0..max_retries {
        let attempt = async {
            match &params.llm_client {
                LLMClient::Ollama(ollama) => {
                    ollama_completion(ollama, transcript, &params.model, params.temperature).await
                }
                LLMClient::OpenAI(client) => {
                    openai_completion(client, transcript, &params.model, params.temperature).await
                }
            }
        };

        match timeout(Duration::from_secs(120), attempt).await {
            Ok(Ok(response)) => {
                response_text = response;
                debug!(target: TARGET_LLM_REQUEST, "Completion received: {}", response_text);
                break;
            }
            Ok(Err(e)) => {
                warn!(target: TARGET_LLM_REQUEST, "Error generating completion: {}", e);
                if retry_count < max_retries - 1 {
                    info!(target: TARGET_LLM_REQUEST, "Retrying completion request... ({}/{})", retry_count + 1, max_retries);
                } else {
                    error!(target: TARGET_LLM_REQUEST, "Failed to generate completion after {} retries", max_retries);
                }
            }
            Err(_) => {
                warn!(target: TARGET_LLM_REQUEST, "Completion request timed out");
                if retry_count < max_retries - 1 {
                    info!(target: TARGET_LLM_REQUEST, "Retrying completion request... ({}/{})", retry_count + 1, max_retries);
                } else {
                    error!(target: TARGET_LLM_REQUEST, "Failed to generate completion after {} retries due to timeouts", max_retries);
                }
            }
        }

        if retry_count < max_retries - 1 {
            debug!(target: TARGET_LLM_REQUEST, "Backing off for {} seconds before retry", backoff);
            sleep(Duration::from_secs(backoff)).await;
            backoff *= 2; // Exponential backoff
        }
    }

    if response_text.is_empty() {
        error!(target: TARGET_LLM_REQUEST, "No completion generated after all retries");
        None
    } else {
        Some(response_text)
    }
}

async fn ollama_completion(
    ollama: &Ollama,
    transcript: &[Message],
    model: &str,
    temperature: f32,
) -> Result<String> {
    let mut request = GenerationRequest::new(model.to_string(), flatten_transcript(transcript));
    request.options = Some(GenerationOptions::default().temperature(temperature));

    let response = ollama
        .generate(request)
        .await
        .map_err(|e| anyhow!("ollama generate failed: {}", e))?;

    Ok(response.response)
}

async fn openai_completion(
    client: &OpenAIClient<OpenAIConfig>,
    transcript: &[Message],
    model: &str,
    temperature: f32,
) -> Result<String> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(transcript.len());
    for message in transcript {
        let converted = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
        };
        messages.push(converted);
    }

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(temperature)
        .build()?;

    let response = client.chat().create(request).await?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("completion response contained no choices"))
}

/// Renders a transcript as a single completion prompt for backends driven
/// through the plain generate API. Role labels keep the few-shot structure
/// visible to the model.
fn flatten_transcript(transcript: &[Message]) -> String {
    let mut prompt = String::new();
    for message in transcript {
        let label = match message.role {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Assistant:");
    prompt
}
