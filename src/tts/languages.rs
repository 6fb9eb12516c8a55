//! Таблица языков для классификации голосов
//!
//! Одна неизменяемая таблица на всё приложение: коды, английские и местные
//! названия. Порядок записей важен - при пересечении ключевых слов
//! побеждает первая подходящая запись. Классификация эвристическая и
//! не даёт оценки уверенности.

use lazy_static::lazy_static;
use once_cell::sync::Lazy;
use regex::Regex;

/// Ключ группы для голосов, язык которых определить не удалось
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Один язык
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Ключ группы (английское название)
    pub key: &'static str,
    /// Двухбуквенные коды ISO 639-1
    pub codes: &'static [&'static str],
    /// Варианты названия в нижнем регистре: английские и местные
    pub names: &'static [&'static str],
}

impl LanguageEntry {
    fn has_code(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    fn has_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names.iter().any(|n| *n == name)
    }
}

const ENTRIES: &[LanguageEntry] = &[
    LanguageEntry { key: "English", codes: &["en"], names: &["english", "anglais", "inglés"] },
    LanguageEntry { key: "French", codes: &["fr"], names: &["french", "français", "francais"] },
    LanguageEntry { key: "Spanish", codes: &["es"], names: &["spanish", "español", "espanol", "castellano"] },
    LanguageEntry { key: "German", codes: &["de"], names: &["german", "deutsch"] },
    LanguageEntry { key: "Italian", codes: &["it"], names: &["italian", "italiano"] },
    LanguageEntry { key: "Portuguese", codes: &["pt"], names: &["portuguese", "português", "portugues", "brazilian"] },
    LanguageEntry { key: "Russian", codes: &["ru"], names: &["russian", "русский", "russkiy"] },
    LanguageEntry { key: "Vietnamese", codes: &["vi"], names: &["vietnamese", "tiếng việt", "tieng viet"] },
    LanguageEntry { key: "Japanese", codes: &["ja"], names: &["japanese", "日本語", "nihongo"] },
    LanguageEntry { key: "Chinese", codes: &["zh"], names: &["chinese", "mandarin", "cantonese", "中文"] },
    LanguageEntry { key: "Korean", codes: &["ko"], names: &["korean", "한국어"] },
    LanguageEntry { key: "Dutch", codes: &["nl"], names: &["dutch", "nederlands"] },
    LanguageEntry { key: "Polish", codes: &["pl"], names: &["polish", "polski"] },
    LanguageEntry { key: "Ukrainian", codes: &["uk"], names: &["ukrainian", "українська"] },
    LanguageEntry { key: "Turkish", codes: &["tr"], names: &["turkish", "türkçe", "turkce"] },
    LanguageEntry { key: "Swedish", codes: &["sv"], names: &["swedish", "svenska"] },
    LanguageEntry { key: "Arabic", codes: &["ar"], names: &["arabic", "العربية"] },
    LanguageEntry { key: "Hindi", codes: &["hi"], names: &["hindi", "हिन्दी"] },
];

lazy_static! {
    // Либо значение целиком - код ("fr"), либо локаль внутри значения ("fr-FR", "pt_BR")
    static ref CODE_RE: Regex =
        Regex::new(r"(?i)^\s*([a-z]{2})\s*$|\b([a-z]{2})[-_][a-z]{2}\b").expect("code pattern is valid");
}

static DEFAULT_TABLE: Lazy<LanguageTable> = Lazy::new(|| LanguageTable {
    entries: ENTRIES.to_vec(),
});

/// Таблица языков
#[derive(Debug, Clone)]
pub struct LanguageTable {
    entries: Vec<LanguageEntry>,
}

impl LanguageTable {
    /// Общая таблица по умолчанию
    pub fn shared() -> &'static LanguageTable {
        &DEFAULT_TABLE
    }

    pub fn new(entries: Vec<LanguageEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    /// Язык по явному значению метки: код, локаль или название
    pub fn resolve_label(&self, value: &str) -> Option<&LanguageEntry> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let code = value.split(['-', '_']).next().unwrap_or(value);
        self.entries
            .iter()
            .find(|entry| entry.has_code(code) || entry.has_name(value))
    }

    /// Язык по коду, найденному внутри произвольного значения метки
    pub fn detect_code(&self, value: &str) -> Option<&LanguageEntry> {
        CODE_RE.captures_iter(value).find_map(|caps| {
            let code = caps.get(1).or_else(|| caps.get(2))?.as_str();
            self.entries.iter().find(|entry| entry.has_code(code))
        })
    }

    /// Язык по ключевому слову в отображаемом имени голоса
    pub fn match_name(&self, display_name: &str) -> Option<&LanguageEntry> {
        let name = display_name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.names.iter().any(|keyword| name.contains(keyword)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_label() {
        let table = LanguageTable::shared();
        assert_eq!(table.resolve_label("fr").unwrap().key, "French");
        assert_eq!(table.resolve_label("FR-ca").unwrap().key, "French");
        assert_eq!(table.resolve_label("Français").unwrap().key, "French");
        assert_eq!(table.resolve_label("italian").unwrap().key, "Italian");
        assert!(table.resolve_label("klingon").is_none());
        assert!(table.resolve_label("").is_none());
    }

    #[test]
    fn test_detect_code_inside_value() {
        let table = LanguageTable::shared();
        assert_eq!(table.detect_code("native pt_BR speaker").unwrap().key, "Portuguese");
        assert_eq!(table.detect_code("de").unwrap().key, "German");
        // Отдельные двухбуквенные слова внутри фразы кодом не считаются
        assert!(table.detect_code("makes it calm").is_none());
    }

    #[test]
    fn test_name_keywords_first_match_wins() {
        let table = LanguageTable::shared();
        assert_eq!(table.match_name("Chloé - Français").unwrap().key, "French");
        assert_eq!(table.match_name("Narrator (English / Spanish)").unwrap().key, "English");
        assert!(table.match_name("Rachel").is_none());
    }
}
