//! Answer generation.
//!
//! `dw ask` runs the retrieval pipeline, concatenates the selected
//! fragments as context, and asks a chat-completion backend for a
//! grounded natural-language answer. The backend is an external
//! collaborator: this module only formats the context, makes the call,
//! and renders the reply alongside the usual retrieval diagnostics.

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docweave_core::intent::IntentConfig;
use docweave_core::models::{Fragment, OriginKind};
use docweave_core::store::EmptyCorpus;

use crate::config::Config;
use crate::db;
use crate::query;
use crate::sqlite_store::SqliteStore;

const SYSTEM_PROMPT: &str = "You are an expert on this codebase, with access to its source code \
and documentation. Analyze the provided context before answering. When code is present, explain \
how it works; when documentation is present, show usage examples. Verify that every API you \
mention exists in the provided code — never invent methods, classes, or parameters. If the \
documentation and the code contradict each other, trust the code and state the contradiction \
plainly. Be specific, practical, and concise, and name source files when that clarifies where \
something lives.";

pub async fn run_ask(config: &Config, question: &str, k_override: Option<usize>) -> Result<()> {
    if !config.answer.is_enabled() {
        bail!("Answer backend is disabled. Set [answer] provider in config.");
    }

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let intent_config = IntentConfig::default();
    let k = k_override.unwrap_or(config.retrieval.k);

    let result = match query::retrieve(config, &store, question, k, &intent_config).await {
        Ok(result) => result,
        Err(e) if e.downcast_ref::<EmptyCorpus>().is_some() => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    if result.fragments.is_empty() {
        println!("No relevant fragments found.");
        store.pool().close().await;
        return Ok(());
    }

    let context = build_context(&result.fragments);
    let answer = chat_completion(config, &context, question)
        .await
        .context("answer backend call failed")?;

    println!("{}", answer.trim());
    println!();
    println!("--- retrieval ---");
    println!("intent: {}", result.intent.as_str());
    println!(
        "fragments: {} ({} doc, {} code)",
        result.fragments.len(),
        result.count_of(OriginKind::Doc),
        result.count_of(OriginKind::Code),
    );
    for fragment in &result.fragments {
        println!("  [{}] {}", fragment.origin.as_str(), fragment.id);
    }

    store.pool().close().await;
    Ok(())
}

/// Concatenate fragment contents with provenance headers.
fn build_context(fragments: &[Fragment]) -> String {
    let mut context = String::new();
    for fragment in fragments {
        context.push_str(&format!(
            "--- [{}] {} :: {} ---\n{}\n\n",
            fragment.origin.as_str(),
            fragment.file,
            fragment.section,
            fragment.content
        ));
    }
    context
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

async fn chat_completion(config: &Config, context: &str, question: &str) -> Result<String> {
    match config.answer.provider.as_str() {
        "openai" => chat_openai(config, context, question).await,
        "disabled" => bail!("Answer backend is disabled"),
        other => bail!("Unknown answer provider: {}", other),
    }
}

async fn chat_openai(config: &Config, context: &str, question: &str) -> Result<String> {
    let api_key =
        std::env::var("OPENAI_API_KEY").map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
    let model = config
        .answer
        .model
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("answer.model required"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.answer.timeout_secs))
        .build()?;

    let user_content = format!("CONTEXT:\n{}\nQUESTION: {}", context, question);
    let body = ChatRequest {
        model,
        max_tokens: config.answer.max_tokens,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: &user_content,
            },
        ],
    };

    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .context("failed to call chat completions")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        bail!("answer backend returned {}: {}", status, text);
    }

    let parsed: ChatResponse = resp.json().await.context("failed to parse chat response")?;
    let answer = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .unwrap_or_default();
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_carries_provenance() {
        let fragment = Fragment::new(
            OriginKind::Code,
            "code/sample.py",
            "Bar.method",
            "def method(self):\n    pass",
            5,
            6,
        )
        .unwrap();
        let context = build_context(&[fragment]);
        assert!(context.contains("[code] code/sample.py :: Bar.method"));
        assert!(context.contains("def method(self):"));
    }
}
