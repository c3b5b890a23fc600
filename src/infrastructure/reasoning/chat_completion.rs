//! OpenAI-compatible chat-completion reasoner

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::response_shapes::extract_text;
use crate::application::credentials::ApiKeyResolver;
use crate::application::ports::{ApiError, Reasoner, ReasoningError};
use crate::application::retry::with_retry;
use crate::domain::config::endpoint::{build_api_url, CHAT_COMPLETIONS_PATH};
use crate::domain::credential::Credential;
use crate::domain::reasoning::{
    PromptTemplate, ReasoningConfig, TokenLimits, DEFAULT_REASONING_MODEL, SYSTEM_INSTRUCTION,
};
use crate::domain::retry::RetryPolicy;
use crate::infrastructure::http::{
    build_client, ensure_success, map_transport_error, read_json, DEFAULT_REQUEST_TIMEOUT,
};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

/// Held for the duration of one `clean` call; releases the slot on drop,
/// including when the call future is cancelled.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends the transcript to `<base>/chat/completions` for cleanup.
///
/// At most one request per instance is in flight; a concurrent `clean`
/// fails fast with [`ReasoningError::AlreadyInFlight`].
pub struct ChatCompletionReasoner {
    client: reqwest::Client,
    keys: Arc<ApiKeyResolver>,
    endpoint: String,
    retry: RetryPolicy,
    limits: TokenLimits,
    in_flight: AtomicBool,
}

impl ChatCompletionReasoner {
    pub fn new(keys: Arc<ApiKeyResolver>, base_url: &str) -> Self {
        Self {
            client: build_client(DEFAULT_REQUEST_TIMEOUT),
            keys,
            endpoint: build_api_url(base_url, CHAT_COMPLETIONS_PATH),
            retry: RetryPolicy::api(),
            limits: TokenLimits::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_token_limits(mut self, limits: TokenLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    async fn send(&self, request: &ChatRequest<'_>, key: &Credential) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key.expose())
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;
        read_json(response).await
    }
}

#[async_trait]
impl Reasoner for ChatCompletionReasoner {
    async fn is_available(&self) -> bool {
        self.keys.has_key().await
    }

    async fn clean(
        &self,
        text: &str,
        model_id: &str,
        persona: Option<&str>,
        config: &ReasoningConfig,
    ) -> Result<String, ReasoningError> {
        let _guard =
            InFlightGuard::acquire(&self.in_flight).ok_or(ReasoningError::AlreadyInFlight)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(ReasoningError::EmptyInput);
        }

        let key = self
            .keys
            .get_key(false)
            .await
            .map_err(|_| ReasoningError::CredentialNotFound)?;

        let model = match model_id.trim() {
            "" => DEFAULT_REASONING_MODEL,
            id => id,
        };
        let template = PromptTemplate::select(text, persona);
        let user_prompt = template.render(text);
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: config.temperature_or_default(),
            max_tokens: config.max_tokens_for(text, &self.limits),
        };

        info!(
            model,
            agent_mode = template.is_agent(),
            max_tokens = request.max_tokens,
            "Sending transcript for cleanup"
        );

        let payload = with_retry(&self.retry, "reasoning", || self.send(&request, &key)).await?;

        let cleaned = extract_text(&payload).ok_or(ReasoningError::EmptyResult)?;
        debug!(chars = cleaned.chars().count(), "Reasoning complete");
        Ok(cleaned)
    }
}
