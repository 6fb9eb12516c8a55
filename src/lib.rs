//! Основной файл библиотеки flashcards-creator
//!
//! Превращает пары фраз в колоды Anki с озвучкой через ElevenLabs и
//! подсказками о сложности лексики.

pub mod analysis;
pub mod config;
pub mod deck;
pub mod error;
pub mod text;
pub mod tts;
pub mod utils;

use std::collections::HashSet;
use std::sync::Arc;

use crate::analysis::{FrequencyOracle, SentenceAnalysis, SentenceAnalyzer, ZipfTable};
use crate::config::AppConfig;
use crate::deck::{default_deck_title, hierarchical_deck_name, DeckBuildReport, DeckBuilder};
pub use crate::error::{AppError, AppResult};
use crate::text::PhrasePair;
use crate::tts::{
    AudioArtifact, ElevenLabsClient, FailoverSynthesizer, SynthesisCache, SynthesisRequest,
    TtsProvider, VoiceDirectory,
};

/// Точка входа для всех операций
pub struct FlashcardsCreator {
    config: AppConfig,
    /// Нет, если ключ API не задан; анализ текста работает и без него
    provider: Option<Arc<dyn TtsProvider>>,
    frequencies: Arc<dyn FrequencyOracle>,
}

impl FlashcardsCreator {
    /// Создать экземпляр по конфигурации: клиент ElevenLabs и частотные списки
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let provider: Option<Arc<dyn TtsProvider>> = match ElevenLabsClient::new(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(AppError::ConfigurationError(message)) => {
                log::debug!("TTS provider disabled: {}", message);
                None
            }
            Err(e) => return Err(e),
        };
        let frequencies = Arc::new(ZipfTable::load(&config.analysis.frequency_lists));

        Ok(Self {
            config,
            provider,
            frequencies,
        })
    }

    /// Экземпляр с готовыми зависимостями
    pub fn with_dependencies(
        config: AppConfig,
        provider: Arc<dyn TtsProvider>,
        frequencies: Arc<dyn FrequencyOracle>,
    ) -> Self {
        Self {
            config,
            provider: Some(provider),
            frequencies,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn provider(&self) -> AppResult<Arc<dyn TtsProvider>> {
        match &self.provider {
            Some(provider) => Ok(provider.clone()),
            None => {
                self.config.require_api_key()?;
                Err(AppError::ConfigurationError("TTS provider is not configured".to_string()))
            }
        }
    }

    pub fn analyzer(&self) -> SentenceAnalyzer {
        SentenceAnalyzer::new(self.frequencies.clone(), self.config.analysis.clone())
    }

    pub fn analyze(&self, sentence: &str, known_words: &HashSet<String>) -> SentenceAnalysis {
        self.analyzer().analyze(sentence, known_words)
    }

    pub fn voice_directory(&self) -> AppResult<VoiceDirectory> {
        Ok(VoiceDirectory::new(self.provider()?, self.config.voices.clone()))
    }

    pub fn cache(&self) -> AppResult<SynthesisCache> {
        Ok(SynthesisCache::new(self.provider()?, self.config.cache_dir.clone()))
    }

    pub fn synthesizer(&self) -> AppResult<FailoverSynthesizer> {
        Ok(FailoverSynthesizer::new(self.cache()?).with_shuffle(self.config.voices.shuffle_candidates))
    }

    /// Синтезировать одну фразу конкретным голосом (через кэш)
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        speaking_rate: Option<f32>,
    ) -> AppResult<AudioArtifact> {
        let defaults = &self.config.synthesis;
        let mut request = SynthesisRequest::new(text, voice_id, defaults);
        if let Some(rate) = speaking_rate {
            request = request.with_speaking_rate(rate, defaults);
        }
        self.cache()?.get_or_create(&request).await
    }

    /// Собрать колоду с именем `<флаг>::<тип>::<заголовок>`
    ///
    /// Без заголовка используется текущая дата.
    pub async fn build_deck(
        &self,
        pairs: &[PhrasePair],
        language_label: &str,
        title: Option<&str>,
    ) -> AppResult<DeckBuildReport> {
        let title = title.map(str::to_string).unwrap_or_else(default_deck_title);
        let mut deck = self.config.deck.clone();
        deck.deck_name = hierarchical_deck_name(language_label, deck.card_type, &title);

        let builder = DeckBuilder::new(
            self.voice_directory()?,
            self.synthesizer()?,
            self.config.synthesis.clone(),
            deck,
        )
        .with_analyzer(self.analyzer());
        builder.build(pairs, language_label).await
    }
}
