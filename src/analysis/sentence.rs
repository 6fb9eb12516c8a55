//! Анализ предложения: строки по токенам, статистика и кандидаты для карточек

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::difficulty::{BandThresholds, DifficultyBand};
use super::frequency::FrequencyOracle;
use crate::config::{AnalysisConfig, CandidateOrder};
use crate::text::tokenizer::{normalize_token, tokenize};

/// Одно вхождение слова в предложении
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRow {
    /// Слово как в тексте
    pub surface: String,
    /// Форма для поиска в словаре (нижний регистр)
    pub normalized: String,
    /// Оценка Zipf; 0.0 - слово словарю неизвестно
    pub commonality: f64,
    pub band: DifficultyBand,
    pub is_rare: bool,
    pub is_known: bool,
}

/// Итог анализа одного предложения
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceAnalysis {
    /// Токены в порядке появления
    pub tokens: Vec<TokenRow>,
    pub mean_commonality: f64,
    pub median_commonality: f64,
    /// Доля редких слов (0..1)
    pub rare_share: f64,
    /// Доля уже известных слов (0..1)
    pub known_share: f64,
    pub flashcard_candidates: Vec<TokenRow>,
    /// Самое редкое слово
    pub hardest: Option<TokenRow>,
    /// Самое частотное слово
    pub easiest: Option<TokenRow>,
    /// Уровень по средней оценке, по порогам анализатора
    pub band: DifficultyBand,
    /// Частотный словарь был недоступен, все оценки равны нулю
    pub degraded: bool,
}

impl SentenceAnalysis {
    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    /// Уровень сложности по средней оценке
    pub fn overall_band(&self) -> DifficultyBand {
        self.band
    }

    /// Короткая сводка для поля заметок карточки
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} (mean {:.2})",
            self.overall_band().label(),
            self.mean_commonality
        );
        if !self.flashcard_candidates.is_empty() {
            let words: Vec<&str> = self
                .flashcard_candidates
                .iter()
                .map(|row| row.surface.as_str())
                .collect();
            summary.push_str(&format!(" | to learn: {}", words.join(", ")));
        }
        summary
    }
}

/// Анализатор предложений
pub struct SentenceAnalyzer {
    oracle: Arc<dyn FrequencyOracle>,
    config: AnalysisConfig,
    thresholds: BandThresholds,
}

impl SentenceAnalyzer {
    pub fn new(oracle: Arc<dyn FrequencyOracle>, config: AnalysisConfig) -> Self {
        Self {
            oracle,
            config,
            thresholds: BandThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: BandThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Проанализировать предложение
    ///
    /// Анализ всегда завершается: если словарь недоступен, оценки
    /// становятся нулевыми и выставляется флаг `degraded`.
    pub fn analyze(&self, sentence: &str, known_words: &HashSet<String>) -> SentenceAnalysis {
        let known: HashSet<String> = known_words.iter().map(|w| normalize_token(w)).collect();
        let language = self.config.language_code.as_str();
        let mut degraded = false;

        let tokens: Vec<TokenRow> = tokenize(sentence)
            .into_iter()
            .map(|surface| {
                let normalized = normalize_token(surface);
                let raw = match self.oracle.score(&normalized, language) {
                    Ok(score) => score,
                    Err(e) => {
                        if !degraded {
                            log::warn!("Frequency lookup degraded to zero scores: {}", e);
                        }
                        degraded = true;
                        0.0
                    }
                };
                // Уровень и редкость считаются по точной оценке, округляется только значение
                TokenRow {
                    surface: surface.to_string(),
                    band: self.thresholds.classify(raw),
                    is_rare: raw < self.config.rare_threshold,
                    is_known: known.contains(&normalized),
                    normalized,
                    commonality: round_to(raw, self.config.round_digits),
                }
            })
            .collect();

        self.summarize(tokens, degraded)
    }

    fn summarize(&self, tokens: Vec<TokenRow>, degraded: bool) -> SentenceAnalysis {
        let digits = self.config.round_digits;

        // Пустое предложение считается одним токеном с нулевой оценкой
        let mut scores: Vec<f64> = tokens.iter().map(|row| row.commonality).collect();
        if scores.is_empty() {
            scores.push(0.0);
        }
        let denominator = tokens.len().max(1) as f64;
        let rare = tokens.iter().filter(|row| row.is_rare).count() as f64;
        let known = tokens.iter().filter(|row| row.is_known).count() as f64;

        let candidates = self.select_candidates(&tokens);

        // При равных оценках побеждает первое вхождение
        let hardest = tokens
            .iter()
            .reduce(|best, row| if row.commonality < best.commonality { row } else { best })
            .cloned();
        let easiest = tokens
            .iter()
            .reduce(|best, row| if row.commonality > best.commonality { row } else { best })
            .cloned();

        let mean_commonality = round_to(mean(&scores), digits);

        SentenceAnalysis {
            band: self.thresholds.classify(mean_commonality),
            mean_commonality,
            median_commonality: round_to(median(&scores), digits),
            rare_share: round_to(rare / denominator, digits),
            known_share: round_to(known / denominator, digits),
            flashcard_candidates: candidates,
            hardest,
            easiest,
            tokens,
            degraded,
        }
    }

    /// Незнакомые слова из "полезного" диапазона частотности
    fn select_candidates(&self, tokens: &[TokenRow]) -> Vec<TokenRow> {
        let mut candidates: Vec<TokenRow> = tokens
            .iter()
            .filter(|row| {
                !row.is_known
                    && row.commonality >= self.config.useful_min
                    && row.commonality <= self.config.useful_max
            })
            .cloned()
            .collect();

        match self.config.candidate_order {
            CandidateOrder::Ascending => {
                candidates.sort_by(|a, b| a.commonality.total_cmp(&b.commonality))
            }
            CandidateOrder::Descending => {
                candidates.sort_by(|a, b| b.commonality.total_cmp(&a.commonality))
            }
        }
        candidates
    }
}

fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
