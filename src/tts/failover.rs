//! Синтез с перебором голосов
//!
//! Пробуем голоса по очереди. Повтор с другим голосом делается только при
//! отказе провайдера по конкретному голосу; любая другая ошибка
//! возвращается сразу.

use rand::seq::SliceRandom;

use super::cache::SynthesisCache;
use super::{AudioArtifact, SynthesisRequest};
use crate::error::{AppError, AppResult};

pub struct FailoverSynthesizer {
    cache: SynthesisCache,
    shuffle: bool,
}

impl FailoverSynthesizer {
    pub fn new(cache: SynthesisCache) -> Self {
        Self {
            cache,
            shuffle: false,
        }
    }

    /// Перемешивать кандидатов перед каждым вызовом
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn cache(&self) -> &SynthesisCache {
        &self.cache
    }

    /// Синтезировать `text`, перебирая `candidate_voice_ids`
    ///
    /// Параметры синтеза берутся из `template`; его текст и голос
    /// заменяются. Повторяющиеся id пробуются один раз.
    pub async fn synthesize_with_failover(
        &self,
        text: &str,
        candidate_voice_ids: &[String],
        template: &SynthesisRequest,
    ) -> AppResult<AudioArtifact> {
        let mut candidates: Vec<&str> = Vec::with_capacity(candidate_voice_ids.len());
        for id in candidate_voice_ids {
            if !id.is_empty() && !candidates.contains(&id.as_str()) {
                candidates.push(id);
            }
        }
        if candidates.is_empty() {
            return Err(AppError::NoEligibleVoice("candidate list is empty".to_string()));
        }
        if self.shuffle {
            candidates.shuffle(&mut rand::thread_rng());
        }

        let request = template.with_text(text);
        let mut tried = Vec::new();
        let mut last_error = None;

        for voice_id in candidates {
            log::debug!("Trying voice {} for '{}'", voice_id, preview(text));
            match self.cache.get_or_create(&request.with_voice(voice_id)).await {
                Ok(artifact) => {
                    if !tried.is_empty() {
                        log::info!("Voice {} succeeded after {} rejected", voice_id, tried.len());
                    }
                    return Ok(artifact);
                }
                Err(e) if e.is_voice_ineligible() => {
                    log::warn!("Voice {} rejected: {}", voice_id, e);
                    tried.push(voice_id.to_string());
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        let last = last_error.unwrap_or_else(|| AppError::NoEligibleVoice("no voice accepted".to_string()));
        log::error!("All {} candidate voices rejected", tried.len());
        Err(AppError::VoicesExhausted {
            tried,
            last: Box::new(last),
        })
    }
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}
