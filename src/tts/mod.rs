//! # TTS модуль
//!
//! Синтез речи через внешнего провайдера: каталог голосов, кэш
//! синтезированного аудио по содержимому запроса и перебор голосов
//! при отказе провайдера.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SynthesisDefaults;
use crate::error::AppResult;

pub mod cache;
pub mod elevenlabs;
pub mod failover;
pub mod languages;
pub mod voices;

pub use cache::SynthesisCache;
pub use elevenlabs::ElevenLabsClient;
pub use failover::FailoverSynthesizer;
pub use languages::{LanguageEntry, LanguageTable};
pub use voices::VoiceDirectory;

/// Количество hex-символов дайджеста в имени файла
const DIGEST_LEN: usize = 12;

/// Поток байтов аудио от провайдера
pub type AudioStream = BoxStream<'static, AppResult<Bytes>>;

/// Голос в том виде, в каком его отдаёт провайдер
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVoice {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Option<HashMap<String, serde_json::Value>>,
}

/// Голос для синтеза
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceDescriptor {
    pub id: String,
    pub display_name: String,
    /// Метки провайдера (язык, акцент, категория...); могут отсутствовать
    pub labels: BTreeMap<String, String>,
}

impl VoiceDescriptor {
    /// Нормализовать голос провайдера; отсутствующие поля становятся пустыми
    pub fn from_raw(raw: RawVoice) -> Self {
        let labels = raw
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, value))
            })
            .collect();

        Self {
            id: raw.voice_id.unwrap_or_default(),
            display_name: raw.name.unwrap_or_default(),
            labels,
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(|s| s.as_str())
    }
}

/// Запрос на синтез; он же ключ кэша
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    /// Уже ограничена допустимым диапазоном провайдера
    pub speaking_rate: f32,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    pub output_format: String,
}

impl SynthesisRequest {
    /// Запрос с параметрами по умолчанию
    pub fn new(text: &str, voice_id: &str, defaults: &SynthesisDefaults) -> Self {
        Self {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            model_id: defaults.model_id.clone(),
            speaking_rate: clamp_rate(defaults.speaking_rate, defaults),
            stability: defaults.stability,
            similarity_boost: defaults.similarity_boost,
            style: defaults.style,
            use_speaker_boost: defaults.use_speaker_boost,
            output_format: defaults.output_format.clone(),
        }
    }

    pub fn with_speaking_rate(mut self, rate: f32, defaults: &SynthesisDefaults) -> Self {
        self.speaking_rate = clamp_rate(rate, defaults);
        self
    }

    pub fn with_text(&self, text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..self.clone()
        }
    }

    pub fn with_voice(&self, voice_id: &str) -> Self {
        Self {
            voice_id: voice_id.to_string(),
            ..self.clone()
        }
    }

    /// Каноническое представление всех полей
    ///
    /// Каждое поле записывается с префиксом длины, поэтому никакое
    /// содержимое текста не может склеить два разных запроса.
    fn canonical(&self) -> String {
        let fields = [
            self.text.clone(),
            self.voice_id.clone(),
            self.model_id.clone(),
            self.speaking_rate.to_string(),
            self.stability.to_string(),
            self.similarity_boost.to_string(),
            self.style.to_string(),
            self.use_speaker_boost.to_string(),
            self.output_format.clone(),
        ];
        fields
            .iter()
            .map(|field| format!("{}:{}", field.len(), field))
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }

    /// Стабильный дайджест запроса
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical().as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(DIGEST_LEN);
        digest
    }

    pub fn filename(&self) -> String {
        format!("{}.mp3", self.digest())
    }
}

/// Ограничить скорость диапазоном; не паникует даже при неверных границах
fn clamp_rate(rate: f32, defaults: &SynthesisDefaults) -> f32 {
    let rate = if rate.is_finite() { rate } else { 1.0 };
    rate.max(defaults.min_speaking_rate).min(defaults.max_speaking_rate)
}

/// Синтезированный аудиофайл в кэше
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioArtifact {
    pub filename: String,
    pub local_path: PathBuf,
}

/// Провайдер синтеза речи
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Все голоса, доступные аккаунту
    async fn list_voices(&self) -> AppResult<Vec<RawVoice>>;

    /// Синтезировать речь; отказ по конкретному голосу возвращается как
    /// `AppError::VoiceIneligible`
    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<AudioStream>;
}

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
mod tests {
    mod test_cache;
    mod test_failover;
    mod test_request;
    mod test_voices;
}
