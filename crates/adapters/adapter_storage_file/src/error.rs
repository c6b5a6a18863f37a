//! File storage error types.

use std::path::PathBuf;

use autotheme_domain::error::AutoThemeError;

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file {}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode configuration")]
    EncodeConfig(#[source] toml::ser::Error),

    #[error("invalid location cache {}", path.display())]
    ParseLocation {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FileStoreError {
    /// Convert into a [`AutoThemeError::Storage`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> AutoThemeError {
        AutoThemeError::Storage(Box::new(self))
    }
}

impl From<FileStoreError> for AutoThemeError {
    fn from(err: FileStoreError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_path_in_io_error() {
        let err = FileStoreError::Io {
            path: PathBuf::from("/tmp/autotheme.toml"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "failed to access /tmp/autotheme.toml");
    }

    #[test]
    fn should_convert_to_storage_error() {
        let err: AutoThemeError = FileStoreError::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::other("boom"),
        }
        .into();
        assert!(matches!(err, AutoThemeError::Storage(_)));
    }
}
