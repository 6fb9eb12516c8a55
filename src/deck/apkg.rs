//! Запись колоды в архив `.apkg`
//!
//! Архив - это zip с базой `collection.anki2` (SQLite, схема 11), картой
//! медиа `media` в JSON и самими медиафайлами под их номерами.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use rusqlite::{params, Connection};
use serde_json::json;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::models::{Note, NoteModel};
use crate::config::CardType;
use crate::error::{AppError, AppResult};
use crate::utils::temp;

const COLLECTION_FILE: &str = "collection.anki2";
const MEDIA_MAP_FILE: &str = "media";
const DEFAULT_DECK_ID: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE col (
    id integer primary key, crt integer not null, mod integer not null,
    scm integer not null, ver integer not null, dty integer not null,
    usn integer not null, ls integer not null, conf text not null,
    models text not null, decks text not null, dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key, guid text not null, mid integer not null,
    mod integer not null, usn integer not null, tags text not null,
    flds text not null, sfld integer not null, csum integer not null,
    flags integer not null, data text not null
);
CREATE TABLE cards (
    id integer primary key, nid integer not null, did integer not null,
    ord integer not null, mod integer not null, usn integer not null,
    type integer not null, queue integer not null, due integer not null,
    ivl integer not null, factor integer not null, reps integer not null,
    lapses integer not null, left integer not null, odue integer not null,
    odid integer not null, flags integer not null, data text not null
);
CREATE TABLE revlog (
    id integer primary key, cid integer not null, usn integer not null,
    ease integer not null, ivl integer not null, lastIvl integer not null,
    factor integer not null, time integer not null, type integer not null
);
CREATE TABLE graves (usn integer not null, oid integer not null, type integer not null);
CREATE INDEX ix_notes_usn ON notes (usn);
CREATE INDEX ix_cards_usn ON cards (usn);
CREATE INDEX ix_revlog_usn ON revlog (usn);
CREATE INDEX ix_cards_nid ON cards (nid);
CREATE INDEX ix_cards_sched ON cards (did, queue, due);
CREATE INDEX ix_revlog_cid ON revlog (cid);
CREATE INDEX ix_notes_csum ON notes (csum);
"#;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").expect("tag pattern is valid");
}

/// Флаги для корня иерархии колод
const FLAGS: &[(&str, &str)] = &[
    ("French", "🇫🇷"),
    ("Italian", "🇮🇹"),
    ("Vietnamese Central", "🇻🇳"),
    ("Russian", "🇷🇺"),
];

/// Имя колоды вида `🇫🇷::Recall::2026-10-14`
///
/// Язык без флага в таблице используется как есть; пустые части по краям
/// отбрасываются.
pub fn hierarchical_deck_name(language_label: &str, card_type: CardType, title: &str) -> String {
    let root = FLAGS
        .iter()
        .find(|(label, _)| *label == language_label)
        .map(|(_, flag)| *flag)
        .unwrap_or(language_label);
    format!("{}::{}::{}", root, card_type.title(), title)
        .trim_matches(':')
        .to_string()
}

/// Заголовок колоды по умолчанию: текущая дата
pub fn default_deck_title() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Случайный id колоды из диапазона, который использует Anki
pub fn random_deck_id() -> i64 {
    rand::thread_rng().gen_range(1_000_000_000..10_000_000_000)
}

/// Всё, что нужно для записи одной колоды
#[derive(Debug, Clone)]
pub struct DeckPackage {
    pub deck_id: i64,
    pub name: String,
    pub model: NoteModel,
    pub notes: Vec<Note>,
    /// Пути к медиафайлам; имя файла в архиве - последний компонент пути
    pub media: Vec<PathBuf>,
}

pub trait DeckPackager: Send + Sync {
    /// Записать колоду в `output`
    fn write(&self, deck: &DeckPackage, output: &Path) -> AppResult<()>;
}

/// Упаковщик `.apkg`
#[derive(Debug, Default, Clone)]
pub struct ApkgWriter;

impl ApkgWriter {
    pub fn new() -> Self {
        Self
    }
}

impl DeckPackager for ApkgWriter {
    fn write(&self, deck: &DeckPackage, output: &Path) -> AppResult<()> {
        let media = collect_media(&deck.media)?;

        let workdir = tempfile::tempdir()?;
        let collection_path = workdir.path().join(COLLECTION_FILE);
        write_collection(&collection_path, deck)?;

        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;
        let partial = temp::unique_temp_path(parent, "deck", "apkg");

        if let Err(e) = write_archive(&partial, &collection_path, &media) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        std::fs::rename(&partial, output).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            AppError::PackagingError(format!("Failed to move deck to {}: {}", output.display(), e))
        })?;

        log::info!(
            "Wrote deck '{}' with {} notes and {} media files to {}",
            deck.name,
            deck.notes.len(),
            media.len(),
            output.display()
        );
        Ok(())
    }
}

/// Уникальные медиафайлы: имя в архиве -> путь
fn collect_media(paths: &[PathBuf]) -> AppResult<Vec<(String, PathBuf)>> {
    let mut media: Vec<(String, PathBuf)> = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::PackagingError(format!("Invalid media path {}", path.display())))?;
        if media.iter().any(|(existing, _)| *existing == name) {
            continue;
        }
        if !path.is_file() {
            return Err(AppError::PackagingError(format!(
                "Media file {} does not exist",
                path.display()
            )));
        }
        media.push((name, path.clone()));
    }
    Ok(media)
}

fn write_collection(path: &Path, deck: &DeckPackage) -> AppResult<()> {
    let now = chrono::Utc::now();
    let now_secs = now.timestamp();
    let now_ms = now.timestamp_millis();
    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc().timestamp())
        .unwrap_or(now_secs);

    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO col VALUES (1, ?1, ?2, ?3, 11, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
        params![
            day_start,
            now_ms,
            now_ms,
            collection_conf(deck).to_string(),
            json!({ deck.model.id.to_string(): deck.model.to_collection_json(deck.deck_id, now_secs) })
                .to_string(),
            decks_json(deck, now_secs).to_string(),
            deck_options_json().to_string(),
        ],
    )?;

    for (index, note) in deck.notes.iter().enumerate() {
        let note_id = now_ms + index as i64;
        let fields = note.fields();
        let sort_field = strip_html(&fields[0]);

        tx.execute(
            "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
            params![
                note_id,
                note_guid(deck.model.id, &fields),
                deck.model.id,
                now_secs,
                fields.join("\u{1f}"),
                sort_field,
                field_checksum(&sort_field),
            ],
        )?;
        tx.execute(
            "INSERT INTO cards VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            params![note_id, note_id, deck.deck_id, now_secs, index as i64 + 1],
        )?;
    }
    tx.commit()?;
    conn.close().map_err(|(_, e)| AppError::DatabaseError(e))?;
    Ok(())
}

fn write_archive(path: &Path, collection: &Path, media: &[(String, PathBuf)]) -> AppResult<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(COLLECTION_FILE, options)?;
    zip.write_all(&std::fs::read(collection)?)?;

    let media_map: BTreeMap<String, &str> = media
        .iter()
        .enumerate()
        .map(|(index, (name, _))| (index.to_string(), name.as_str()))
        .collect();
    zip.start_file(MEDIA_MAP_FILE, options)?;
    zip.write_all(serde_json::to_string(&media_map)?.as_bytes())?;

    for (index, (_, source)) in media.iter().enumerate() {
        zip.start_file(index.to_string(), options)?;
        zip.write_all(&std::fs::read(source)?)?;
    }

    zip.finish()?.sync_all()?;
    Ok(())
}

fn collection_conf(deck: &DeckPackage) -> serde_json::Value {
    json!({
        "activeDecks": [DEFAULT_DECK_ID],
        "curDeck": DEFAULT_DECK_ID,
        "curModel": deck.model.id,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true,
    })
}

fn deck_json(id: i64, name: &str, modified_secs: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "desc": "",
        "mod": modified_secs,
        "usn": -1,
        "dyn": 0,
        "conf": 1,
        "collapsed": false,
        "browserCollapsed": false,
        "extendNew": 10,
        "extendRev": 50,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0],
    })
}

fn decks_json(deck: &DeckPackage, modified_secs: i64) -> serde_json::Value {
    json!({
        DEFAULT_DECK_ID.to_string(): deck_json(DEFAULT_DECK_ID, "Default", 0),
        deck.deck_id.to_string(): deck_json(deck.deck_id, &deck.name, modified_secs),
    })
}

fn deck_options_json() -> serde_json::Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "dyn": false,
            "maxTaken": 60,
            "timer": 0,
            "autoplay": true,
            "replayq": true,
            "new": { "delays": [1, 10], "ints": [1, 4, 7], "initialFactor": 2500, "order": 1, "perDay": 20 },
            "rev": { "perDay": 200, "ease4": 1.3, "ivlFct": 1, "maxIvl": 36500 },
            "lapse": { "delays": [10], "mult": 0, "minInt": 1, "leechFails": 8, "leechAction": 0 },
        }
    })
}

fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").trim().to_string()
}

/// Стабильный guid заметки: одинаковые поля дают одну и ту же заметку
fn note_guid(model_id: i64, fields: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model_id.to_string().as_bytes());
    for field in fields {
        hasher.update([0x1f]);
        hasher.update(field.as_bytes());
    }
    let mut guid = hex::encode(hasher.finalize());
    guid.truncate(16);
    guid
}

/// Контрольная сумма поля сортировки: первые 8 hex-символов SHA-1
fn field_checksum(sort_field: &str) -> i64 {
    let digest = Sha1::digest(sort_field.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}
