//! TOML-backed [`ConfigStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use autotheme_app::ports::ConfigStore;
use autotheme_domain::error::AutoThemeError;
use autotheme_domain::settings::SwitchConfig;

use crate::error::FileStoreError;

/// Stores the [`SwitchConfig`] in a single TOML file.
///
/// Saves go through a sibling temporary file and a rename so a crash never
/// leaves a half-written configuration behind.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SwitchConfig, FileStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no stored configuration, using defaults");
                return Ok(SwitchConfig::default());
            }
            Err(source) => {
                return Err(FileStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| FileStoreError::ParseConfig {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, content: String) -> Result<(), FileStoreError> {
        let io = |source| FileStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io)?;
        }
        let staging = self.path.with_extension("toml.tmp");
        tokio::fs::write(&staging, content).await.map_err(io)?;
        tokio::fs::rename(&staging, &self.path).await.map_err(io)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> impl Future<Output = Result<SwitchConfig, AutoThemeError>> + Send {
        async move { Ok(self.read().await?) }
    }

    fn save(
        &self,
        config: &SwitchConfig,
    ) -> impl Future<Output = Result<(), AutoThemeError>> + Send {
        let encoded = toml::to_string_pretty(config).map_err(FileStoreError::EncodeConfig);
        async move { Ok(self.write(encoded?).await?) }
    }
}
