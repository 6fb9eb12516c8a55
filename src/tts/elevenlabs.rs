//! # ElevenLabs TTS Integration
//!
//! HTTP-адаптер провайдера: список голосов и потоковый синтез. Ошибки
//! провайдера разбираются здесь, в одном месте: отказ по голосу становится
//! `VoiceIneligible`, всё остальное - `SynthesisError`.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AudioStream, RawVoice, SynthesisRequest, TtsProvider};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Статусы ошибок, означающие, что голос недоступен этому аккаунту
const INELIGIBLE_STATUSES: &[&str] = &[
    "famous_voice_not_permitted",
    "voice_not_found",
    "voice_not_permitted",
];

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<RawVoice>,
}

#[derive(Debug, Serialize)]
struct VoiceSettingsBody {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
    speed: f32,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettingsBody,
}

/// Клиент ElevenLabs API
pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsClient {
    /// Создать клиент; без ключа API - ошибка конфигурации
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TtsProvider for ElevenLabsClient {
    async fn list_voices(&self) -> AppResult<Vec<RawVoice>> {
        log::debug!("Fetching voice list from {}", self.base_url);

        let response = self
            .client
            .get(format!("{}/v1/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ConfigurationError(format!("Voice directory unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Voice directory request failed (status {}): {}", status, body);
            return Err(AppError::ConfigurationError(format!(
                "Voice directory request failed (status {}): {}",
                status,
                error_message(&body).unwrap_or(body.clone())
            )));
        }

        let parsed: VoicesResponse = response
            .json()
            .await
            .map_err(|e| AppError::ConfigurationError(format!("Invalid voice list: {}", e)))?;
        log::info!("Provider returned {} voices", parsed.voices.len());
        Ok(parsed.voices)
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<AudioStream> {
        log::info!(
            "Sending TTS request: voice={} model={} rate={} chars={}",
            request.voice_id,
            request.model_id,
            request.speaking_rate,
            request.text.chars().count()
        );

        let body = SpeechBody {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: VoiceSettingsBody {
                stability: request.stability,
                similarity_boost: request.similarity_boost,
                style: request.style,
                use_speaker_boost: request.use_speaker_boost,
                speed: request.speaking_rate,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/text-to-speech/{}/stream",
                self.base_url, request.voice_id
            ))
            .query(&[
                ("output_format", request.output_format.as_str()),
                ("optimize_streaming_latency", "0"),
            ])
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
            let error = classify_error(status, &payload, &request.voice_id);
            log::error!("ElevenLabs error for voice {}: {}", request.voice_id, error);
            return Err(error);
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(AppError::from))
            .boxed())
    }
}

/// Достать `detail.status` и `detail.message` из тела ошибки
///
/// Тело может быть обёрнуто в произвольный текст, поэтому JSON ищется
/// с первой открывающей скобки.
pub fn extract_error_status(payload: &str) -> Option<(String, String)> {
    let start = payload.find('{')?;
    let json: Value = serde_json::from_str(&payload[start..]).ok()?;
    let detail = json.get("detail")?;
    let status = detail.get("status")?.as_str()?.to_string();
    let message = detail
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((status, message))
}

fn error_message(payload: &str) -> Option<String> {
    extract_error_status(payload).map(|(status, message)| format!("{}: {}", status, message))
}

/// Единственная точка, где решается: отказ по голосу или ошибка синтеза
pub fn classify_error(status: StatusCode, payload: &str, voice_id: &str) -> AppError {
    match extract_error_status(payload) {
        Some((code, message)) if INELIGIBLE_STATUSES.contains(&code.as_str()) => {
            AppError::VoiceIneligible {
                voice_id: voice_id.to_string(),
                status: code,
                message,
            }
        }
        Some((code, message)) => {
            AppError::SynthesisError(format!("status {} ({}): {}", status, code, message))
        }
        None => AppError::SynthesisError(format!("status {}: {}", status, payload.trim())),
    }
}
