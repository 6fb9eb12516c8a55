//! Каталог голосов провайдера
//!
//! Получает список голосов, группирует его по языкам и подбирает
//! голоса-кандидаты для синтеза карточек по политике из конфигурации.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::languages::{LanguageTable, UNKNOWN_LANGUAGE};
use super::{TtsProvider, VoiceDescriptor};
use crate::config::VoicePolicy;
use crate::error::{AppError, AppResult};

/// Метка с явным языком голоса
const LANGUAGE_LABEL: &str = "language";
const CATEGORY_LABEL: &str = "category";

/// Каталог голосов
pub struct VoiceDirectory {
    provider: Arc<dyn TtsProvider>,
    policy: VoicePolicy,
    languages: &'static LanguageTable,
}

impl VoiceDirectory {
    pub fn new(provider: Arc<dyn TtsProvider>, policy: VoicePolicy) -> Self {
        Self {
            provider,
            policy,
            languages: LanguageTable::shared(),
        }
    }

    pub fn policy(&self) -> &VoicePolicy {
        &self.policy
    }

    /// Запросить голоса у провайдера (один запрос на вызов)
    ///
    /// Любая ошибка здесь - ошибка конфигурации: без каталога голосов
    /// синтез невозможен.
    pub async fn list_voices(&self) -> AppResult<Vec<VoiceDescriptor>> {
        let raw = self.provider.list_voices().await.map_err(|e| match e {
            AppError::ConfigurationError(_) => e,
            other => AppError::ConfigurationError(format!("Voice directory unavailable: {}", other)),
        })?;
        Ok(raw.into_iter().map(VoiceDescriptor::from_raw).collect())
    }

    /// Голоса, сгруппированные по языку
    pub async fn group_by_language(&self) -> AppResult<BTreeMap<String, Vec<VoiceDescriptor>>> {
        let voices = self.list_voices().await?;
        Ok(group_voices(self.languages, voices))
    }

    /// Голоса, у которых метка языка точно совпадает с `label`
    ///
    /// Пустой результат означает "подходящих голосов нет"; все голоса
    /// вместо него никогда не возвращаются.
    pub async fn voices_for_language_strict(&self, label: &str) -> AppResult<Vec<(String, String)>> {
        let voices = self.list_voices().await?;
        Ok(strict_matches(&voices, label)
            .into_iter()
            .map(|voice| (voice.id.clone(), voice.display_name.clone()))
            .collect())
    }

    /// Голоса-кандидаты для синтеза карточек на языке `label`
    ///
    /// Порядок: белый список префиксов (если задан для языка, применяется
    /// строго), затем точное совпадение метки, затем эвристическая группа,
    /// затем (если разрешено) любые голоса. Голоса из исключённых
    /// категорий отбрасываются.
    pub async fn resolve_candidates(&self, label: &str) -> AppResult<Vec<String>> {
        let voices = self.list_voices().await?;

        let selected: Vec<&VoiceDescriptor> =
            if let Some(prefixes) = self.policy.whitelist_prefixes.get(label) {
                let allowed: Vec<&VoiceDescriptor> = voices
                    .iter()
                    .filter(|v| !v.id.is_empty() && prefixes.iter().any(|p| v.id.starts_with(p.as_str())))
                    .collect();
                log::info!("Whitelist applied for '{}': {} voices", label, allowed.len());
                allowed
            } else {
                let mut selected = strict_matches(&voices, label);
                if selected.is_empty() {
                    let key = self
                        .languages
                        .resolve_label(label)
                        .map(|entry| entry.key)
                        .unwrap_or(label);
                    selected = voices
                        .iter()
                        .filter(|v| language_key(self.languages, v) == key)
                        .collect();
                    if !selected.is_empty() {
                        log::info!("Using {} heuristically grouped voices for '{}'", selected.len(), label);
                    }
                }
                if selected.is_empty() && self.policy.fallback_to_any_voice {
                    log::warn!("No voices labelled '{}', falling back to all voices", label);
                    selected = voices.iter().collect();
                }
                selected
            };

        let before = selected.len();
        let candidates: Vec<String> = selected
            .into_iter()
            .filter(|v| !v.id.is_empty() && !self.is_excluded(v))
            .map(|v| v.id.clone())
            .collect();
        if candidates.len() != before {
            log::info!("Filtered {} voices from excluded categories", before - candidates.len());
        }

        log::info!("Resolved {} candidate voices for '{}'", candidates.len(), label);
        Ok(candidates)
    }

    fn is_excluded(&self, voice: &VoiceDescriptor) -> bool {
        voice
            .label(CATEGORY_LABEL)
            .map(|category| {
                self.policy
                    .excluded_categories
                    .iter()
                    .any(|excluded| excluded.eq_ignore_ascii_case(category.trim()))
            })
            .unwrap_or(false)
    }
}

/// Ключ языка для голоса
///
/// 1. явная метка `language`, если она распознаётся таблицей;
/// 2. код языка внутри любой метки;
/// 3. ключевое слово в имени голоса;
/// 4. `"Unknown"`.
pub fn language_key(table: &LanguageTable, voice: &VoiceDescriptor) -> &'static str {
    if let Some(entry) = voice.label(LANGUAGE_LABEL).and_then(|value| table.resolve_label(value)) {
        return entry.key;
    }
    if let Some(entry) = voice.labels.values().find_map(|value| table.detect_code(value)) {
        return entry.key;
    }
    if let Some(entry) = table.match_name(&voice.display_name) {
        return entry.key;
    }
    UNKNOWN_LANGUAGE
}

/// Сгруппировать голоса по ключу языка, сохраняя порядок внутри групп
pub fn group_voices(
    table: &LanguageTable,
    voices: Vec<VoiceDescriptor>,
) -> BTreeMap<String, Vec<VoiceDescriptor>> {
    let mut groups: BTreeMap<String, Vec<VoiceDescriptor>> = BTreeMap::new();
    for voice in voices {
        let key = language_key(table, &voice);
        groups.entry(key.to_string()).or_default().push(voice);
    }
    groups
}

/// Строгий отбор по метке языка
///
/// Голос с явной меткой `language` подходит только при совпадении без учёта
/// регистра. Голос без неё подходит, если `label` встречается в значении
/// любой метки.
pub fn strict_matches<'a>(voices: &'a [VoiceDescriptor], label: &str) -> Vec<&'a VoiceDescriptor> {
    let target = label.trim().to_lowercase();
    if target.is_empty() {
        return Vec::new();
    }
    voices
        .iter()
        .filter(|voice| match voice.label(LANGUAGE_LABEL) {
            Some(language) => language.trim().to_lowercase() == target,
            None => voice
                .labels
                .values()
                .any(|value| value.to_lowercase().contains(&target)),
        })
        .collect()
}
