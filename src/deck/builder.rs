//! Пакетная сборка колоды
//!
//! Карточки обрабатываются по одной, в порядке входа. Ошибка синтеза одной
//! карточки не останавливает сборку (если не включён `abort_on_error`):
//! заметка попадает в колоду без аудио, а ошибка - в отчёт.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::apkg::{random_deck_id, ApkgWriter, DeckPackage, DeckPackager};
use super::models::{Note, NoteModel};
use crate::analysis::SentenceAnalyzer;
use crate::config::{DeckConfig, SynthesisDefaults};
use crate::error::{AppError, AppResult};
use crate::text::{add_formality_markers, check_formality, PhrasePair};
use crate::tts::{FailoverSynthesizer, SynthesisRequest, VoiceDirectory};

/// Ошибка по одной карточке
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Номер строки во входных данных
    pub row: usize,
    pub message: String,
}

/// Результат сборки
#[derive(Debug, Clone, Serialize)]
pub struct DeckBuildReport {
    pub deck_path: PathBuf,
    pub deck_name: String,
    pub notes: usize,
    pub media_files: usize,
    pub failures: Vec<ItemFailure>,
}

pub struct DeckBuilder {
    directory: VoiceDirectory,
    synthesizer: FailoverSynthesizer,
    analyzer: Option<SentenceAnalyzer>,
    packager: Arc<dyn DeckPackager>,
    synthesis: SynthesisDefaults,
    options: DeckConfig,
}

impl DeckBuilder {
    pub fn new(
        directory: VoiceDirectory,
        synthesizer: FailoverSynthesizer,
        synthesis: SynthesisDefaults,
        options: DeckConfig,
    ) -> Self {
        Self {
            directory,
            synthesizer,
            analyzer: None,
            packager: Arc::new(ApkgWriter::new()),
            synthesis,
            options,
        }
    }

    /// Анализатор для поля Notes (используется при `annotate_difficulty`)
    pub fn with_analyzer(mut self, analyzer: SentenceAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_packager(mut self, packager: Arc<dyn DeckPackager>) -> Self {
        self.packager = packager;
        self
    }

    pub fn options(&self) -> &DeckConfig {
        &self.options
    }

    /// Собрать колоду из пар фраз с озвучкой на языке `language_label`
    pub async fn build(&self, pairs: &[PhrasePair], language_label: &str) -> AppResult<DeckBuildReport> {
        log::info!(
            "Building deck '{}': {} pairs, card type {}, language '{}'",
            self.options.deck_name,
            pairs.len(),
            self.options.card_type.as_str(),
            language_label
        );

        // Кандидаты подбираются один раз на всю колоду
        let candidates = self.directory.resolve_candidates(language_label).await?;
        if candidates.is_empty() {
            log::warn!("No eligible voices for '{}', notes will have no audio", language_label);
        }

        let template = SynthesisRequest::new("", "", &self.synthesis);
        let known_words = HashSet::new();
        let mut notes = Vec::with_capacity(pairs.len());
        let mut media = Vec::new();
        let mut failures = Vec::new();

        for pair in pairs {
            let mut note = Note {
                user_text: self.user_text(pair),
                audio_filename: None,
                target_text: pair.target.clone(),
                target_ipa: String::new(),
                notes: String::new(),
                card_type: self.options.card_type.as_str().to_string(),
            };

            if self.options.annotate_difficulty && !pair.target.is_empty() {
                if let Some(analyzer) = &self.analyzer {
                    note.notes = analyzer.analyze(&pair.target, &known_words).summary();
                }
            }

            if !pair.target.is_empty() {
                let result = if candidates.is_empty() {
                    Err(AppError::NoEligibleVoice(format!("language '{}'", language_label)))
                } else {
                    self.synthesizer
                        .synthesize_with_failover(&pair.target, &candidates, &template)
                        .await
                };

                match result {
                    Ok(artifact) => {
                        log::debug!("Row {}: audio {}", pair.row, artifact.filename);
                        note.audio_filename = Some(artifact.filename);
                        media.push(artifact.local_path);
                    }
                    Err(e) if self.options.abort_on_error => {
                        log::error!("Row {}: {}, aborting deck build", pair.row, e);
                        return Err(e);
                    }
                    Err(e) => {
                        log::warn!("Row {}: {}", pair.row, e);
                        failures.push(ItemFailure {
                            row: pair.row,
                            message: e.to_string(),
                        });
                    }
                }
            }

            notes.push(note);
        }

        let deck_id = random_deck_id();
        let deck_path = self.options.output_dir.join(format!("deck_{}.apkg", deck_id));
        let package = DeckPackage {
            deck_id,
            name: self.options.deck_name.clone(),
            model: NoteModel::for_card_type(self.options.card_type),
            notes,
            media,
        };
        self.packager.write(&package, &deck_path)?;

        let mut distinct_media = package.media.clone();
        distinct_media.sort();
        distinct_media.dedup();

        if !failures.is_empty() {
            log::warn!("{} of {} cards have no audio", failures.len(), pairs.len());
        }

        Ok(DeckBuildReport {
            deck_path,
            deck_name: package.name,
            notes: package.notes.len(),
            media_files: distinct_media.len(),
            failures,
        })
    }

    fn user_text(&self, pair: &PhrasePair) -> String {
        if !self.options.mark_formality {
            return pair.user.clone();
        }
        match check_formality(&pair.target).pronoun_type {
            Some(pronoun_type) => add_formality_markers(&pair.user, pronoun_type),
            None => pair.user.clone(),
        }
    }
}
