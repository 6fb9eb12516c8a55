//! Провайдер-заглушка для тестов: хранит голоса в памяти и записывает вызовы

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use super::{AudioStream, RawVoice, SynthesisRequest, TtsProvider};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct FakeProvider {
    pub voices: Vec<RawVoice>,
    /// Голоса, на которые провайдер отвечает отказом по политике
    pub rejected: HashSet<String>,
    /// Голоса, на которых синтез падает с обычной ошибкой
    pub broken: HashSet<String>,
    /// Голоса, для которых провайдер возвращает пустое аудио
    pub silent: HashSet<String>,
    /// Каталог голосов недоступен
    pub directory_down: bool,
    pub calls: Mutex<Vec<SynthesisRequest>>,
}

impl FakeProvider {
    pub fn with_voices(voices: &[(&str, &str, &[(&str, &str)])]) -> Self {
        Self {
            voices: voices
                .iter()
                .map(|(id, name, labels)| raw_voice(id, name, labels))
                .collect(),
            ..Self::default()
        }
    }

    pub fn reject(mut self, voice_id: &str) -> Self {
        self.rejected.insert(voice_id.to_string());
        self
    }

    pub fn break_voice(mut self, voice_id: &str) -> Self {
        self.broken.insert(voice_id.to_string());
        self
    }

    pub fn silence(mut self, voice_id: &str) -> Self {
        self.silent.insert(voice_id.to_string());
        self
    }

    pub fn synth_calls(&self) -> Vec<SynthesisRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn synth_voice_order(&self) -> Vec<String> {
        self.synth_calls().into_iter().map(|r| r.voice_id).collect()
    }
}

pub fn raw_voice(id: &str, name: &str, labels: &[(&str, &str)]) -> RawVoice {
    let labels: HashMap<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    RawVoice {
        voice_id: Some(id.to_string()),
        name: Some(name.to_string()),
        labels: Some(labels),
    }
}

#[async_trait]
impl TtsProvider for FakeProvider {
    async fn list_voices(&self) -> AppResult<Vec<RawVoice>> {
        if self.directory_down {
            return Err(AppError::SynthesisError("connection refused".to_string()));
        }
        Ok(self.voices.clone())
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<AudioStream> {
        self.calls.lock().unwrap().push(request.clone());

        if self.rejected.contains(&request.voice_id) {
            return Err(AppError::VoiceIneligible {
                voice_id: request.voice_id.clone(),
                status: "famous_voice_not_permitted".to_string(),
                message: "voice not available via API".to_string(),
            });
        }
        if self.broken.contains(&request.voice_id) {
            return Err(AppError::SynthesisError("rate limited".to_string()));
        }
        if self.silent.contains(&request.voice_id) {
            return Ok(futures::stream::empty().boxed());
        }

        let payload = format!("ID3:{}:{}", request.voice_id, request.text).into_bytes();
        let (head, tail) = payload.split_at(payload.len() / 2);
        let chunks = vec![
            Ok(Bytes::copy_from_slice(head)),
            Ok(Bytes::copy_from_slice(tail)),
        ];
        Ok(futures::stream::iter(chunks).boxed())
    }
}
