//! Токенизатор для французского текста
//!
//! Токен - это максимальная последовательность букв (включая буквы с
//! диакритикой и лигатуры œ/æ), за которой может следовать одно
//! продолжение через апостроф (`j'ai`, `l'homme`). Всё остальное -
//! разделители.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(
        r"[A-Za-zÀ-ÖØ-öø-ÿŒœÆæ]+(?:['’][A-Za-zÀ-ÖØ-öø-ÿŒœÆæ]+)?"
    )
    .expect("word pattern is valid");
}

/// Разбить текст на токены в порядке появления
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Форма для поиска в частотном словаре
pub fn normalize_token(token: &str) -> String {
    token.to_lowercase().replace('’', "'")
}
