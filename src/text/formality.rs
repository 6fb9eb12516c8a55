//! Проверка формального/неформального "вы" во французском тексте

use serde::Serialize;

use super::tokenizer::{normalize_token, tokenize};

const INFORMAL_WORDS: &[&str] = &["tu", "te", "ton", "ta", "tes"];
const FORMAL_WORDS: &[&str] = &["vos", "votre"];

const MARKER_INFORMAL: &str = "(informal you)";
const MARKER_FORMAL: &str = "(formal you)";
const MARKER_MIXED: &str = "(informal you, formal you)";

/// Тип обращения, найденного в тексте
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PronounType {
    Informal,
    Formal,
    Mixed,
}

/// Результат проверки
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormalityCheck {
    pub has_pronouns: bool,
    pub pronoun_type: Option<PronounType>,
    /// Предупреждение для пользователя
    pub warning: Option<String>,
}

impl FormalityCheck {
    fn none() -> Self {
        Self {
            has_pronouns: false,
            pronoun_type: None,
            warning: None,
        }
    }

    fn found(pronoun_type: PronounType) -> Self {
        let warning = match pronoun_type {
            PronounType::Mixed => "Mixed formal/informal pronouns detected",
            PronounType::Informal => {
                "Informal 'you' (tu/t'/te/ton) - specify if formal or informal"
            }
            PronounType::Formal => {
                "Formal 'you' (vous/vos/votre) - specify if formal or informal"
            }
        };
        Self {
            has_pronouns: true,
            pronoun_type: Some(pronoun_type),
            warning: Some(warning.to_string()),
        }
    }
}

fn is_informal(word: &str) -> bool {
    INFORMAL_WORDS.contains(&word) || word.starts_with("t'")
}

/// Найти в тексте обращения на "tu" и "vous"
///
/// `vous`, за которым следует слово на `-er` (`vous tutoyer`), не считается
/// формальным обращением.
pub fn check_formality(text: &str) -> FormalityCheck {
    if text.trim().is_empty() {
        return FormalityCheck::none();
    }

    let words: Vec<String> = tokenize(text).into_iter().map(normalize_token).collect();

    let has_informal = words.iter().any(|w| is_informal(w));
    let has_formal = words.iter().enumerate().any(|(i, w)| {
        if FORMAL_WORDS.contains(&w.as_str()) {
            return true;
        }
        w == "vous"
            && !words
                .get(i + 1)
                .map(|next| next.ends_with("er"))
                .unwrap_or(false)
    });

    match (has_informal, has_formal) {
        (true, true) => FormalityCheck::found(PronounType::Mixed),
        (true, false) => FormalityCheck::found(PronounType::Informal),
        (false, true) => FormalityCheck::found(PronounType::Formal),
        (false, false) => FormalityCheck::none(),
    }
}

/// Дописать к английской фразе пометку о типе обращения (один раз)
pub fn add_formality_markers(phrase: &str, pronoun_type: PronounType) -> String {
    match pronoun_type {
        PronounType::Informal if !phrase.ends_with(MARKER_INFORMAL) => {
            format!("{} {}", phrase, MARKER_INFORMAL)
        }
        PronounType::Formal if !phrase.ends_with(MARKER_FORMAL) => {
            format!("{} {}", phrase, MARKER_FORMAL)
        }
        PronounType::Mixed
            if !phrase.contains(MARKER_INFORMAL)
                && !phrase.contains(MARKER_FORMAL)
                && !phrase.ends_with(MARKER_MIXED) =>
        {
            format!("{} {}", phrase, MARKER_MIXED)
        }
        _ => phrase.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_informal_pronouns() {
        let check = check_formality("Tu viens avec ton frère ?");
        assert_eq!(check.pronoun_type, Some(PronounType::Informal));
        assert!(check.has_pronouns);

        let check = check_formality("Je t'aime");
        assert_eq!(check.pronoun_type, Some(PronounType::Informal));
    }

    #[test]
    fn test_formal_pronouns() {
        let check = check_formality("Votre table est prête");
        assert_eq!(check.pronoun_type, Some(PronounType::Formal));
        assert!(check.warning.unwrap().starts_with("Formal"));
    }

    #[test]
    fn test_vous_before_infinitive_is_ignored() {
        let check = check_formality("On peut se vous tutoyer");
        assert_eq!(check.pronoun_type, None);
    }

    #[test]
    fn test_mixed_and_none() {
        assert_eq!(
            check_formality("Tu as vos billets ?").pronoun_type,
            Some(PronounType::Mixed)
        );
        assert_eq!(check_formality("   "), FormalityCheck::none());
        // Внутри слов местоимения не ищем
        assert_eq!(check_formality("La tortue mange").pronoun_type, None);
    }

    #[test]
    fn test_markers_are_idempotent() {
        let once = add_formality_markers("Are you coming?", PronounType::Informal);
        assert_eq!(once, "Are you coming? (informal you)");
        assert_eq!(add_formality_markers(&once, PronounType::Informal), once);

        let mixed = add_formality_markers("Hello", PronounType::Mixed);
        assert_eq!(mixed, "Hello (informal you, formal you)");
        assert_eq!(add_formality_markers(&mixed, PronounType::Mixed), mixed);
        // Уже помеченная фраза второй пометки не получает
        assert_eq!(
            add_formality_markers("Hello (formal you)", PronounType::Mixed),
            "Hello (formal you)"
        );
    }
}
