//! Обработка текста: токенизация, проверка формальности, разбор входных фраз

pub mod formality;
pub mod parsing;
pub mod tokenizer;

pub use formality::{add_formality_markers, check_formality, FormalityCheck, PronounType};
pub use parsing::{parse_two_column_tsv, ColumnOrder, PhrasePair};
pub use tokenizer::{normalize_token, tokenize};
