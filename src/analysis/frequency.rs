//! Частотный словарь
//!
//! Анализатор зависит только от интерфейса [`FrequencyOracle`]. Встроенная
//! реализация читает заранее подготовленные списки `слово<TAB>zipf`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::text::normalize_token;

/// Источник оценок частотности слов
///
/// `Ok(0.0)` означает, что слово словарю неизвестно. `Err` означает, что
/// словарь для языка недоступен целиком.
pub trait FrequencyOracle: Send + Sync {
    fn score(&self, word: &str, language_code: &str) -> AppResult<f64>;
}

/// Таблица оценок Zipf по языкам
#[derive(Debug, Default, Clone)]
pub struct ZipfTable {
    languages: HashMap<String, HashMap<String, f64>>,
}

impl ZipfTable {
    /// Пустая таблица: любой запрос вернёт ошибку недоступности
    pub fn empty() -> Self {
        Self::default()
    }

    /// Загрузить все списки из конфигурации
    ///
    /// Файл, который не удалось прочитать, пропускается с предупреждением:
    /// язык останется недоступным, и анализ перейдёт в деградированный режим.
    pub fn load(lists: &HashMap<String, PathBuf>) -> Self {
        let mut table = Self::empty();
        for (language, path) in lists {
            match read_list(path) {
                Ok(words) => {
                    log::info!(
                        "Loaded {} frequency entries for '{}' from {}",
                        words.len(),
                        language,
                        path.display()
                    );
                    table.languages.insert(language.to_lowercase(), words);
                }
                Err(e) => log::warn!("Frequency list for '{}' unavailable: {}", language, e),
            }
        }
        table
    }

    /// Загрузить один список и вернуть ошибку, если он не читается
    pub fn load_language(&mut self, language_code: &str, path: &Path) -> AppResult<usize> {
        let words = read_list(path)?;
        let count = words.len();
        self.languages.insert(language_code.to_lowercase(), words);
        Ok(count)
    }

    /// Добавить оценку вручную
    pub fn insert(&mut self, language_code: &str, word: &str, score: f64) {
        self.languages
            .entry(language_code.to_lowercase())
            .or_default()
            .insert(normalize_token(word), score);
    }

    pub fn has_language(&self, language_code: &str) -> bool {
        self.languages.contains_key(&language_code.to_lowercase())
    }
}

impl FrequencyOracle for ZipfTable {
    fn score(&self, word: &str, language_code: &str) -> AppResult<f64> {
        let words = self
            .languages
            .get(&language_code.to_lowercase())
            .ok_or_else(|| {
                AppError::FrequencyListError(format!(
                    "no frequency list loaded for '{}'",
                    language_code
                ))
            })?;
        Ok(words.get(word).copied().unwrap_or(0.0))
    }
}

fn read_list(path: &Path) -> AppResult<HashMap<String, f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AppError::FrequencyListError(format!("{}: {}", path.display(), e)))?;

    let mut words = HashMap::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::FrequencyListError(format!("{}: {}", path.display(), e)))?;
        let (Some(word), Some(value)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let score: f64 = value.parse().map_err(|_| {
            AppError::FrequencyListError(format!(
                "{}: invalid score '{}' for '{}'",
                path.display(),
                value,
                word
            ))
        })?;
        words.insert(normalize_token(word), score);
    }
    Ok(words)
}
