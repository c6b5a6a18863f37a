//! Read-only view of the service's location cache file.

use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;

use autotheme_app::ports::LocationCache;
use autotheme_domain::error::AutoThemeError;
use autotheme_domain::location::LocationData;

use crate::error::FileStoreError;

/// JSON file the service rewrites whenever it gets a fresh position.
#[derive(Debug, Clone)]
pub struct FileLocationCache {
    path: PathBuf,
}

impl FileLocationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_file(&self) -> Result<LocationData, FileStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // The service has not written a fix yet.
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(LocationData::default()),
            Err(source) => {
                return Err(FileStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(LocationData::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| FileStoreError::ParseLocation {
            path: self.path.clone(),
            source,
        })
    }
}

impl LocationCache for FileLocationCache {
    fn read(&self) -> impl Future<Output = Result<LocationData, AutoThemeError>> + Send {
        async move { Ok(self.read_file().await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn should_read_empty_data_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocationCache::new(dir.path().join("location.json"));

        let data = cache.read().await.unwrap();

        assert!(!data.is_populated());
    }

    #[tokio::test]
    async fn should_read_fix_written_by_service() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location.json");
        tokio::fs::write(
            &path,
            r#"{"latitude":47.37,"longitude":8.54,"last_update":"2024-05-01T06:30:00Z"}"#,
        )
        .await
        .unwrap();

        let data = FileLocationCache::new(&path).read().await.unwrap();

        assert!(data.is_populated());
        assert_eq!(
            data.last_update,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap())
        );
        let coords = data.coordinates().unwrap();
        assert!((coords.latitude - 47.37).abs() < 1e-9);
    }

    #[tokio::test]
    async fn should_treat_blank_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location.json");
        tokio::fs::write(&path, "  \n").await.unwrap();

        let data = FileLocationCache::new(&path).read().await.unwrap();

        assert_eq!(data, LocationData::default());
    }

    #[tokio::test]
    async fn should_fail_on_corrupt_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = FileLocationCache::new(&path).read().await.unwrap_err();

        assert!(matches!(err, AutoThemeError::Storage(_)));
    }
}
