//! Анализ сложности лексики
//!
//! Оценки частотности (шкала Zipf, 0..~7) превращаются в уровни сложности,
//! статистику по предложению и список слов-кандидатов для карточек.

pub mod difficulty;
pub mod frequency;
pub mod sentence;

pub use difficulty::{classify, BandThresholds, DifficultyBand};
pub use frequency::{FrequencyOracle, ZipfTable};
pub use sentence::{SentenceAnalysis, SentenceAnalyzer, TokenRow};

#[cfg(test)]
mod tests {
    mod test_sentence;
}
