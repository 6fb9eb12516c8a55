//! Модели заметок Anki
//!
//! Обе модели имеют одинаковый набор полей и отличаются только лицевой
//! стороной карточки. Идентификаторы моделей постоянны, поэтому повторный
//! импорт колоды обновляет существующие заметки, а не плодит новые типы.

use serde_json::{json, Value};

use crate::config::CardType;

pub const RECALL_MODEL_ID: i64 = 2_000_000_001;
pub const RECOGNIZE_MODEL_ID: i64 = 2_000_000_002;

/// Поля заметки в порядке хранения
pub const FIELD_NAMES: [&str; 6] = [
    "UserLanguage",
    "TargetAudio",
    "TargetLanguage",
    "TargetIPA",
    "Notes",
    "card_type",
];

const CSS: &str = r#".card {
    background-color: #eeebd0;
    color: #0b2027;
    font-family: 'Quicksand', sans-serif;
    text-align: center;
    padding: 20px;
}
.user_language { color: #373f51; font-size: 32px; font-weight: 700; margin-bottom: 20px; }
.target_language { font-size: 30px; font-weight: 700; margin-bottom: 20px; }
.target_audio { margin-top: 20px; }
.target_ipa { font-size: 22px; margin-top: 20px; }
.notes { font-size: 20px; margin-top: 20px; }
.target_audio, .target_ipa, .notes { margin: 0 auto; }
"#;

/// Тип заметки с шаблоном карточки
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteModel {
    pub id: i64,
    pub name: &'static str,
    /// Индекс поля, без которого карточка пуста
    pub front_field: usize,
    pub front: String,
    pub back: String,
}

impl NoteModel {
    /// Лицевая сторона: фраза на родном языке
    pub fn recall() -> Self {
        Self {
            id: RECALL_MODEL_ID,
            name: "Recall",
            front_field: 0,
            front: div("user_language", "UserLanguage"),
            back: [
                div("user_language", "UserLanguage"),
                div("target_audio", "TargetAudio"),
                div("target_language", "TargetLanguage"),
                div("target_ipa", "TargetIPA"),
                div("notes", "Notes"),
                div("notes", "card_type"),
            ]
            .join("\n"),
        }
    }

    /// Лицевая сторона: аудио на изучаемом языке
    pub fn recognize() -> Self {
        Self {
            id: RECOGNIZE_MODEL_ID,
            name: "Recognize",
            front_field: 1,
            front: div("target_audio", "TargetAudio"),
            back: [
                div("target_audio", "TargetAudio"),
                div("target_language", "TargetLanguage"),
                div("user_language", "UserLanguage"),
                div("target_ipa", "TargetIPA"),
                div("notes", "Notes"),
                div("notes", "card_type"),
            ]
            .join("\n"),
        }
    }

    pub fn for_card_type(card_type: CardType) -> Self {
        match card_type {
            CardType::Recall => Self::recall(),
            CardType::Recognize => Self::recognize(),
        }
    }

    /// Описание модели в формате коллекции Anki
    pub fn to_collection_json(&self, deck_id: i64, modified_secs: i64) -> Value {
        let fields: Vec<Value> = FIELD_NAMES
            .iter()
            .enumerate()
            .map(|(ord, name)| {
                json!({
                    "name": name,
                    "ord": ord,
                    "sticky": false,
                    "rtl": false,
                    "font": "Arial",
                    "size": 20,
                    "media": [],
                })
            })
            .collect();

        json!({
            "id": self.id,
            "name": self.name,
            "type": 0,
            "mod": modified_secs,
            "usn": -1,
            "sortf": 0,
            "did": deck_id,
            "tmpls": [{
                "name": "Card 1",
                "ord": 0,
                "qfmt": self.front,
                "afmt": self.back,
                "did": null,
                "bqfmt": "",
                "bafmt": "",
            }],
            "flds": fields,
            "css": CSS,
            "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\begin{document}\n",
            "latexPost": "\\end{document}",
            "tags": [],
            "vers": [],
            "req": [[0, "all", [self.front_field]]],
        })
    }
}

fn div(class: &str, field: &str) -> String {
    format!("<div class=\"{}\">{{{{{}}}}}</div>", class, field)
}

/// Заметка колоды
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Note {
    pub user_text: String,
    /// Имя аудиофайла в медиа колоды; пусто, если аудио нет
    pub audio_filename: Option<String>,
    pub target_text: String,
    pub target_ipa: String,
    pub notes: String,
    pub card_type: String,
}

impl Note {
    pub fn fields(&self) -> [String; 6] {
        let audio = self
            .audio_filename
            .as_deref()
            .map(|name| format!("[sound:{}]", name))
            .unwrap_or_default();
        [
            self.user_text.clone(),
            audio,
            self.target_text.clone(),
            self.target_ipa.clone(),
            self.notes.clone(),
            self.card_type.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_side_per_card_type() {
        let recall = NoteModel::for_card_type(CardType::Recall);
        assert_eq!(recall.id, RECALL_MODEL_ID);
        assert_eq!(recall.front, r#"<div class="user_language">{{UserLanguage}}</div>"#);

        let recognize = NoteModel::for_card_type(CardType::Recognize);
        assert_eq!(recognize.id, RECOGNIZE_MODEL_ID);
        assert!(recognize.front.contains("{{TargetAudio}}"));
        assert!(!recognize.front.contains("{{UserLanguage}}"));
    }

    #[test]
    fn test_note_fields_order() {
        let note = Note {
            user_text: "hello".into(),
            audio_filename: Some("0123456789ab.mp3".into()),
            target_text: "bonjour".into(),
            card_type: "recall".into(),
            ..Note::default()
        };
        let fields = note.fields();
        assert_eq!(fields[0], "hello");
        assert_eq!(fields[1], "[sound:0123456789ab.mp3]");
        assert_eq!(fields[2], "bonjour");
        assert_eq!(fields[5], "recall");

        let silent = Note { audio_filename: None, ..note };
        assert_eq!(silent.fields()[1], "");
    }

    #[test]
    fn test_collection_json_lists_all_fields() {
        let model = NoteModel::recall().to_collection_json(42, 0);
        let names: Vec<&str> = model["flds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, FIELD_NAMES.to_vec());
        assert_eq!(model["did"], 42);
    }
}
