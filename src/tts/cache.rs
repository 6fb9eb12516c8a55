//! Модуль для кэширования результатов TTS
//!
//! Имя файла - дайджест всех полей запроса, поэтому одинаковые запросы
//! всегда попадают в один файл, а любое отличие даёт новый. Кэш только
//! растёт: записи не инвалидируются.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use super::{AudioArtifact, SynthesisRequest, TtsProvider};
use crate::error::{AppError, AppResult};
use crate::utils::temp;

/// Кэш синтезированного аудио на диске
pub struct SynthesisCache {
    provider: Arc<dyn TtsProvider>,
    cache_dir: PathBuf,
}

impl SynthesisCache {
    pub fn new(provider: Arc<dyn TtsProvider>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Где лежит (или будет лежать) аудио для запроса; без обращения к провайдеру
    pub fn artifact_for(&self, request: &SynthesisRequest) -> AudioArtifact {
        let filename = request.filename();
        AudioArtifact {
            local_path: self.cache_dir.join(&filename),
            filename,
        }
    }

    /// Уже синтезированное аудио, если оно есть
    pub async fn lookup(&self, request: &SynthesisRequest) -> Option<AudioArtifact> {
        let artifact = self.artifact_for(request);
        match tokio::fs::metadata(&artifact.local_path).await {
            Ok(metadata) if metadata.is_file() => Some(artifact),
            _ => None,
        }
    }

    /// Вернуть аудио из кэша или синтезировать его
    ///
    /// Поток от провайдера пишется во временный файл в той же директории и
    /// переименовывается в конечное имя только после полной записи.
    pub async fn get_or_create(&self, request: &SynthesisRequest) -> AppResult<AudioArtifact> {
        if let Some(artifact) = self.lookup(request).await {
            log::debug!("Cache hit for {} (voice {})", artifact.filename, request.voice_id);
            return Ok(artifact);
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let artifact = self.artifact_for(request);
        log::debug!("Cache miss for {}, synthesizing", artifact.filename);

        let mut stream = self.provider.synthesize(request).await?;

        let temp_path = temp::unique_temp_path(&self.cache_dir, &request.digest(), "tmp");
        let written = match write_stream(&temp_path, &mut stream).await {
            Ok(written) => written,
            Err(e) => {
                temp::discard(&temp_path).await;
                return Err(e);
            }
        };

        if written == 0 {
            temp::discard(&temp_path).await;
            return Err(AppError::SynthesisError(format!(
                "Provider returned empty audio for voice {}",
                request.voice_id
            )));
        }

        temp::commit(&temp_path, &artifact.local_path).await?;
        log::info!("Saved {} bytes of audio to {}", written, artifact.local_path.display());
        Ok(artifact)
    }
}

async fn write_stream(path: &Path, stream: &mut super::AudioStream) -> AppResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
