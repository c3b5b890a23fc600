//! OpenAI-compatible (Whisper) transcription adapter

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use super::transcode::prepare_upload;
use crate::application::credentials::ApiKeyResolver;
use crate::application::ports::{ApiError, Transcriber, TranscriptionError};
use crate::application::retry::with_retry;
use crate::domain::config::endpoint::{build_api_url, TRANSCRIPTIONS_PATH};
use crate::domain::config::DEFAULT_TRANSCRIPTION_MODEL;
use crate::domain::credential::Credential;
use crate::domain::retry::RetryPolicy;
use crate::domain::transcription::{AudioClip, LanguageHint};
use crate::infrastructure::http::{
    build_client, ensure_success, map_transport_error, DEFAULT_REQUEST_TIMEOUT,
};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
}

/// Multipart upload to `<base>/audio/transcriptions`
pub struct WhisperApiTranscriber {
    client: reqwest::Client,
    keys: Arc<ApiKeyResolver>,
    endpoint: String,
    model: String,
    retry: RetryPolicy,
    transcode: bool,
}

impl WhisperApiTranscriber {
    pub fn new(keys: Arc<ApiKeyResolver>, base_url: &str) -> Self {
        Self {
            client: build_client(DEFAULT_REQUEST_TIMEOUT),
            keys,
            endpoint: build_api_url(base_url, TRANSCRIPTIONS_PATH),
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            retry: RetryPolicy::api(),
            transcode: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Upload clips exactly as captured
    pub fn without_transcoding(mut self) -> Self {
        self.transcode = false;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, clip: &AudioClip, language: &LanguageHint) -> Result<Form, ApiError> {
        let file = Part::bytes(clip.data().to_vec())
            .file_name(clip.file_name())
            .mime_str(clip.mime_type().as_str())
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone());
        if let Some(lang) = language.as_field() {
            form = form.text("language", lang.to_string());
        }
        Ok(form)
    }

    async fn send(
        &self,
        clip: &AudioClip,
        language: &LanguageHint,
        key: &Credential,
    ) -> Result<String, TranscriptionError> {
        // reqwest consumes the form, so each attempt builds a fresh one
        let form = self.build_form(clip, language)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key.expose())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;

        let body = response.text().await.map_err(map_transport_error)?;
        let parsed: TranscriptionResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;

        parsed
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(TranscriptionError::EmptyResult)
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    async fn transcribe(
        &self,
        clip: &AudioClip,
        language: &LanguageHint,
    ) -> Result<String, TranscriptionError> {
        if clip.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        let key = self
            .keys
            .get_key(false)
            .await
            .map_err(|_| TranscriptionError::CredentialNotFound)?;

        let upload = if self.transcode {
            let original = clip.clone();
            tokio::task::spawn_blocking(move || prepare_upload(original))
                .await
                .unwrap_or_else(|e| {
                    debug!(error = %e, "Transcode task failed, uploading original clip");
                    clip.clone()
                })
        } else {
            clip.clone()
        };

        info!(
            size = %upload.human_readable_size(),
            mime = %upload.mime_type(),
            model = %self.model,
            %language,
            "Uploading audio for transcription"
        );

        with_retry(&self.retry, "transcription", || {
            self.send(&upload, language, &key)
        })
        .await
    }
}
