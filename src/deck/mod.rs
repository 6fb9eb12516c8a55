//! # Модуль колод
//!
//! Модели заметок, запись архива `.apkg` и пакетная сборка колоды.

pub mod apkg;
pub mod builder;
pub mod models;

pub use apkg::{default_deck_title, hierarchical_deck_name, ApkgWriter, DeckPackage, DeckPackager};
pub use builder::{DeckBuildReport, DeckBuilder, ItemFailure};
pub use models::{Note, NoteModel};
