//! Модуль конфигурации
//!
//! Все пороги, значения по умолчанию и политики выбора голосов собраны здесь,
//! чтобы вызывающий код не держал у себя магических констант.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Переменная окружения с ключом API провайдера
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Параметры синтеза по умолчанию
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisDefaults {
    pub model_id: String,
    pub output_format: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    /// Скорость речи, до ограничения диапазоном провайдера
    pub speaking_rate: f32,
    pub min_speaking_rate: f32,
    pub max_speaking_rate: f32,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_22050_32".to_string(),
            stability: 0.7,
            similarity_boost: 0.7,
            style: 0.0,
            use_speaker_boost: true,
            speaking_rate: 1.0,
            min_speaking_rate: 0.7,
            max_speaking_rate: 1.2,
        }
    }
}

impl SynthesisDefaults {
    /// Границы скорости речи должны быть конечными и упорядоченными
    pub fn validate(&self) -> AppResult<()> {
        let (min, max) = (self.min_speaking_rate, self.max_speaking_rate);
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AppError::ConfigurationError(format!(
                "Invalid speaking rate range: min {} max {}",
                min, max
            )));
        }
        Ok(())
    }
}

/// Порядок кандидатов для карточек
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// По возрастанию оценки частотности
    #[default]
    Ascending,
    /// По убыванию оценки: сначала самые частотные слова
    Descending,
}

/// Настройки анализа сложности предложений
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Код языка для частотного словаря
    pub language_code: String,
    /// Слова с оценкой ниже порога считаются редкими
    pub rare_threshold: f64,
    /// Нижняя граница "полезного" диапазона для карточек
    pub useful_min: f64,
    /// Верхняя граница "полезного" диапазона для карточек
    pub useful_max: f64,
    pub candidate_order: CandidateOrder,
    /// Частотные списки: код языка -> путь к TSV `слово<TAB>zipf`
    pub frequency_lists: HashMap<String, PathBuf>,
    /// Количество знаков после запятой в оценках и статистиках
    pub round_digits: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language_code: "fr".to_string(),
            rare_threshold: 3.0,
            useful_min: 3.0,
            useful_max: 4.8,
            candidate_order: CandidateOrder::default(),
            frequency_lists: HashMap::new(),
            round_digits: 3,
        }
    }
}

/// Политика выбора голосов для языка
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoicePolicy {
    /// Для перечисленных языков разрешены только голоса с этими префиксами id
    pub whitelist_prefixes: HashMap<String, Vec<String>>,
    /// Категории голосов, которые API не пропускает (например, "famous")
    pub excluded_categories: Vec<String>,
    /// Брать любые голоса аккаунта, если строгий поиск ничего не нашёл
    pub fallback_to_any_voice: bool,
    /// Перемешивать кандидатов перед каждой карточкой
    pub shuffle_candidates: bool,
}

impl Default for VoicePolicy {
    fn default() -> Self {
        let mut whitelist_prefixes = HashMap::new();
        whitelist_prefixes.insert("Vietnamese Central".to_string(), vec!["RmcV9c".to_string()]);

        Self {
            whitelist_prefixes,
            excluded_categories: vec!["famous".to_string()],
            fallback_to_any_voice: false,
            shuffle_candidates: true,
        }
    }
}

/// Тип карточки
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Сначала фраза на родном языке
    #[default]
    Recall,
    /// Сначала аудио на изучаемом языке
    #[serde(alias = "recognise")]
    Recognize,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recall => "recall",
            Self::Recognize => "recognize",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Recall => "Recall",
            Self::Recognize => "Recognize",
        }
    }
}

impl std::str::FromStr for CardType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recall" => Ok(Self::Recall),
            "recognize" | "recognise" => Ok(Self::Recognize),
            other => Err(AppError::ConfigurationError(format!("Unknown card type: {}", other))),
        }
    }
}

/// Настройки сборки колоды
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeckConfig {
    pub deck_name: String,
    pub card_type: CardType,
    /// Прерывать всю сборку на первой ошибке синтеза
    pub abort_on_error: bool,
    /// Дописывать "(formal you)" и т.п. к фразе на родном языке
    pub mark_formality: bool,
    /// Заполнять поле Notes результатами анализа сложности
    pub annotate_difficulty: bool,
    pub output_dir: PathBuf,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            deck_name: "Flashcards Creator Deck".to_string(),
            card_type: CardType::default(),
            abort_on_error: false,
            mark_formality: true,
            annotate_difficulty: false,
            output_dir: std::env::temp_dir(),
        }
    }
}

/// Конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ключ API берётся только из окружения и не пишется в файлы
    #[serde(skip)]
    pub api_key: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Директория кэша синтезированного аудио
    pub cache_dir: PathBuf,
    pub synthesis: SynthesisDefaults,
    pub analysis: AnalysisConfig,
    pub voices: VoicePolicy,
    pub deck: DeckConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.elevenlabs.io".to_string(),
            request_timeout_secs: 60,
            cache_dir: std::env::temp_dir().join("anki_media"),
            synthesis: SynthesisDefaults::default(),
            analysis: AnalysisConfig::default(),
            voices: VoicePolicy::default(),
            deck: DeckConfig::default(),
        }
    }
}

impl AppConfig {
    /// Конфигурация по умолчанию с ключом из окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Загрузить конфигурацию из JSON-файла и дополнить ключом из окружения
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigurationError(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let mut config: AppConfig = serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigurationError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        config.synthesis.validate()?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api_key = key.trim().to_string();
        }
    }

    /// Ключ API; его отсутствие - ошибка конфигурации
    pub fn require_api_key(&self) -> AppResult<&str> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::ConfigurationError(format!(
                "{} is not set",
                API_KEY_ENV
            )));
        }
        Ok(&self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_type_parsing() {
        assert_eq!("Recall".parse::<CardType>().unwrap(), CardType::Recall);
        assert_eq!("recognise".parse::<CardType>().unwrap(), CardType::Recognize);
        assert_eq!(" RECOGNIZE ".parse::<CardType>().unwrap(), CardType::Recognize);
        assert!("cloze".parse::<CardType>().is_err());
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = AppConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(AppError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_load_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "analysis": { "useful_max": 5.0 }, "deck": { "card_type": "recognise" } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.analysis.useful_max, 5.0);
        assert_eq!(config.analysis.useful_min, 3.0);
        assert_eq!(config.deck.card_type, CardType::Recognize);
        assert_eq!(config.synthesis.model_id, "eleven_multilingual_v2");
    }

    #[test]
    fn test_inverted_rate_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "synthesis": { "min_speaking_rate": 1.2, "max_speaking_rate": 0.7 } }"#,
        )
        .unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(AppError::ConfigurationError(_))
        ));
        assert!(SynthesisDefaults::default().validate().is_ok());
    }

    #[test]
    fn test_default_voice_policy() {
        let policy = VoicePolicy::default();
        assert_eq!(
            policy.whitelist_prefixes.get("Vietnamese Central"),
            Some(&vec!["RmcV9c".to_string()])
        );
        assert!(policy.excluded_categories.contains(&"famous".to_string()));
        assert!(!policy.fallback_to_any_voice);
    }
}
