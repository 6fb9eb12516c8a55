//! Разбор двухколоночного TSV с парами фраз

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Ячейки, по которым первая строка распознаётся как заголовок
const HEADER_TOKENS: &[&str] = &["French", "English", "English Auto"];

/// Пара фраз: на родном языке пользователя и на изучаемом
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhrasePair {
    pub user: String,
    pub target: String,
    /// Номер строки во входном тексте (с единицы)
    pub row: usize,
}

/// Какая колонка содержит какую фразу
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Слева фраза пользователя, справа - на изучаемом языке
    #[default]
    UserFirst,
    TargetFirst,
}

fn is_header(cells: &[&str]) -> bool {
    let non_empty: Vec<&str> = cells.iter().copied().filter(|c| !c.is_empty()).collect();
    !non_empty.is_empty() && non_empty.iter().all(|c| HEADER_TOKENS.contains(c))
}

/// Разобрать TSV в пары фраз
///
/// Пустые строки пропускаются, строка меньше чем с двумя колонками - ошибка.
pub fn parse_two_column_tsv(text: &str, order: ColumnOrder) -> AppResult<Vec<PhrasePair>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut pairs = Vec::new();
    let mut first = true;

    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(pairs.len() + 1);
        let cells: Vec<&str> = record.iter().collect();

        if std::mem::take(&mut first) && is_header(&cells) {
            log::debug!("Skipping header line: {:?}", cells);
            continue;
        }
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if cells.len() < 2 {
            return Err(AppError::ParseError {
                line,
                message: "expected 2 columns separated by a tab".to_string(),
            });
        }

        let (user, target) = match order {
            ColumnOrder::UserFirst => (cells[0], cells[1]),
            ColumnOrder::TargetFirst => (cells[1], cells[0]),
        };
        pairs.push(PhrasePair {
            user: user.to_string(),
            target: target.to_string(),
            row: line,
        });
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header_and_blank_lines() {
        let text = "English\tFrench\nhello\tbonjour\n\n  goodbye \t au revoir\n";
        let pairs = parse_two_column_tsv(text, ColumnOrder::UserFirst).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].user, "hello");
        assert_eq!(pairs[0].target, "bonjour");
        assert_eq!(pairs[0].row, 2);
        assert_eq!(pairs[1].user, "goodbye");
        assert_eq!(pairs[1].target, "au revoir");
    }

    #[test]
    fn test_swapped_columns() {
        let pairs = parse_two_column_tsv("bonjour\thello", ColumnOrder::TargetFirst).unwrap();
        assert_eq!(pairs[0].user, "hello");
        assert_eq!(pairs[0].target, "bonjour");
    }

    #[test]
    fn test_missing_column_reports_line() {
        let err = parse_two_column_tsv("hello\tbonjour\nmerci\n", ColumnOrder::UserFirst)
            .unwrap_err();
        match err {
            AppError::ParseError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_data_line_is_not_header() {
        let pairs = parse_two_column_tsv("French\tmerci", ColumnOrder::UserFirst).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].user, "French");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_two_column_tsv("", ColumnOrder::UserFirst).unwrap().is_empty());
    }
}
