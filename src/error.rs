//! Модуль обработки ошибок
//!
//! Единая таксономия ошибок для анализа, синтеза речи и сборки колод.

use serde::Serialize;
use thiserror::Error;

/// Ошибки приложения
#[derive(Debug, Error, Serialize)]
pub enum AppError {
    /// Нет ключа API или каталог голосов недоступен
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Провайдер отказал в использовании конкретного голоса
    #[error("Voice {voice_id} is not eligible ({status}): {message}")]
    VoiceIneligible {
        voice_id: String,
        status: String,
        message: String,
    },

    /// Любая другая ошибка на стороне провайдера
    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    /// Перебраны все голоса-кандидаты
    #[error("All candidate voices failed (tried: {}): {last}", tried.join(", "))]
    VoicesExhausted {
        tried: Vec<String>,
        last: Box<AppError>,
    },

    /// Для языка не нашлось ни одного подходящего голоса
    #[error("No eligible voice: {0}")]
    NoEligibleVoice(String),

    #[error("Line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Frequency list error: {0}")]
    FrequencyListError(String),

    #[error("Packaging error: {0}")]
    PackagingError(String),

    #[error("IO error: {0}")]
    #[serde(serialize_with = "serialize_display")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[serde(serialize_with = "serialize_display")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[serde(serialize_with = "serialize_display")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Archive error: {0}")]
    #[serde(serialize_with = "serialize_display")]
    ArchiveError(#[from] zip::result::ZipError),
}

// Сериализация ошибок, которые сами не реализуют serde::Serialize
fn serialize_display<T, S>(err: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.serialize_str(&err.to_string())
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::SynthesisError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        AppError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

impl AppError {
    /// Ошибка, после которой имеет смысл попробовать другой голос
    pub fn is_voice_ineligible(&self) -> bool {
        matches!(self, AppError::VoiceIneligible { .. })
    }
}

/// Тип Result для всего приложения
pub type AppResult<T> = Result<T, AppError>;
