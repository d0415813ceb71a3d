use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::{QaTurn, ScoredListing};

/// Fixed explanation shown when the LLM endpoint cannot be reached
pub const FALLBACK_SUMMARY: &str =
    "These cars matched your stated budget and preferences, ranked by overall value \
     (price, mileage, depreciation and age considered together).";

/// Fixed explanation for the no-matches outcome
pub const NO_MATCHES_SUMMARY: &str = "No cars matched your preferences in the local dataset.";

/// Scripted interview questions used when the LLM is unavailable
const SCRIPTED_QUESTIONS: &[&str] = &[
    "What is your budget for the car, in SGD?",
    "How many people will usually ride in the car?",
    "What will you mainly use the car for?",
    "Do you have a fuel preference, such as petrol, hybrid or EV?",
    "How much mileage on the odometer would you tolerate?",
];

/// Errors from the chat-completions endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("LLM client is unavailable (no API key configured)")]
    Unavailable,
}

/// Client for an OpenAI-compatible chat-completions endpoint (Groq)
///
/// Constructed once at startup. When no API key is configured the
/// client is in an explicit unavailable state and every caller gets a
/// deterministic fallback instead of a failure.
pub struct LlmClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        if api_key.is_none() {
            tracing::warn!("No LLM API key configured; summaries and questions use fallbacks");
        }

        Self {
            base_url,
            api_key,
            model,
            client,
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model for the next interview question
    ///
    /// Returns `Ok(None)` when the model decides the interview is done
    /// (the literal `DONE` marker).
    pub async fn next_question(&self, history: &[QaTurn]) -> Result<Option<String>, LlmError> {
        let prompt = format!(
            "You are a helpful car-purchase advisor in Singapore, running an \
             interview-style Q&A before recommending a used car.\n\n\
             Conversation so far:\n{}\n\n\
             Ask exactly ONE concise question about practical factors (budget, \
             family size, usage, fuel or EV preference, running cost, mileage \
             tolerance). Do not repeat answered topics. If around 5 solid answers \
             have been collected, respond with exactly: DONE\n\
             Return ONLY the question text, or ONLY the word DONE.",
            format_history(history)
        );

        let text = self
            .chat(&[
                ("system", "You write only the next question or DONE."),
                ("user", &prompt),
            ])
            .await?;

        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("done") {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    /// Scripted question for the unavailable state
    ///
    /// Walks a fixed list and stops once it is exhausted.
    pub fn scripted_question(&self, asked: usize) -> Option<String> {
        SCRIPTED_QUESTIONS.get(asked).map(|q| q.to_string())
    }

    /// Summarize the top recommendations in natural language
    ///
    /// Best-effort: any failure degrades to the fixed fallback summary
    /// rather than failing the request.
    pub async fn summarize(&self, history: &[QaTurn], top: &[ScoredListing]) -> String {
        if top.is_empty() {
            return NO_MATCHES_SUMMARY.to_string();
        }

        let prompt = format!(
            "You are an SG car-buying assistant.\n\n\
             The user shared the following preferences:\n{}\n\n\
             The following cars matched the user's needs:\n{}\n\n\
             Provide a concise recommendation summary highlighting why these cars \
             match the user's needs, the strengths of each car, and any important \
             trade-offs.",
            format_history(history),
            format_cars(top)
        );

        match self
            .chat(&[
                ("system", "You summarize used-car recommendations."),
                ("user", &prompt),
            ])
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => FALLBACK_SUMMARY.to_string(),
            Err(e) => {
                tracing::warn!("LLM summary failed, using fallback: {}", e);
                FALLBACK_SUMMARY.to_string()
            }
        }
    }

    /// One chat-completions round trip
    async fn chat(&self, messages: &[(&str, &str)]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::Unavailable)?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "temperature": 0.4,
            "messages": messages
                .iter()
                .map(|(role, content)| json!({ "role": role, "content": content }))
                .collect::<Vec<_>>(),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::ApiError(format!(
                "chat completion failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".into()))
    }
}

/// Pretty-print the Q&A pairs for a prompt
fn format_history(history: &[QaTurn]) -> String {
    if history.is_empty() {
        return "(no previous questions asked yet)".to_string();
    }

    history
        .iter()
        .enumerate()
        .map(|(i, qa)| format!("{}. Q: {}\n   A: {}", i + 1, qa.question, qa.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One markdown bullet per car with the fields the summary leans on
fn format_cars(top: &[ScoredListing]) -> String {
    top.iter()
        .map(|s| {
            let l = &s.listing;
            let price = l
                .price_sgd
                .map(|p| format!("${:.0}", p))
                .unwrap_or_else(|| "N/A".to_string());
            let mileage = l
                .mileage_km
                .map(|m| format!("{:.0} km", m))
                .unwrap_or_else(|| "N/A".to_string());
            let year = l
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let dep = l
                .depreciation_per_year
                .map(|d| format!("${:.0}/yr", d))
                .unwrap_or_else(|| "N/A".to_string());

            format!(
                "- {} {} ({}) — Price: {}, Mileage: {}, Depreciation: {}, Value score: {:.1}",
                l.make.as_deref().unwrap_or("Unknown"),
                l.model.as_deref().unwrap_or(""),
                year,
                price,
                mileage,
                dep,
                s.value_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
