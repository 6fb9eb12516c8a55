//! Временные файлы рядом с конечным файлом
//!
//! Файл пишется под уникальным именем в той же директории, а затем
//! атомарно переименовывается, поэтому под конечным именем никогда
//! не видно частично записанных данных.

use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// Уникальный путь для временного файла в указанной директории
pub fn unique_temp_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let file_name = format!(".{}_{}.{}", prefix, uuid::Uuid::new_v4(), extension);
    dir.join(file_name)
}

/// Переместить временный файл на конечное место
pub async fn commit(temp_path: &Path, final_path: &Path) -> AppResult<()> {
    if let Err(e) = tokio::fs::rename(temp_path, final_path).await {
        let _ = tokio::fs::remove_file(temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Удалить временный файл, игнорируя отсутствие
pub async fn discard(temp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(temp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_temp_paths_differ() {
        let dir = Path::new("/tmp/cache");
        let a = unique_temp_path(dir, "abc", "tmp");
        let b = unique_temp_path(dir, "abc", "tmp");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(dir));
        assert!(a.file_name().unwrap().to_string_lossy().starts_with(".abc_"));
    }

    #[tokio::test]
    async fn test_commit_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = unique_temp_path(dir.path(), "x", "tmp");
        let target = dir.path().join("x.mp3");
        tokio::fs::write(&temp, b"data").await.unwrap();

        commit(&temp, &target).await.unwrap();

        assert!(!temp.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"data");
    }
}
