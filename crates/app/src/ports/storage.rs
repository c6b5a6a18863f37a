//! Storage port: persistence of the switch configuration.

use std::future::Future;

use autotheme_domain::error::AutoThemeError;
use autotheme_domain::settings::SwitchConfig;

/// Loads and saves [`SwitchConfig`]. The on-disk format is the adapter's
/// concern.
pub trait ConfigStore {
    /// Load the stored configuration, or defaults when nothing is stored yet.
    fn load(&self) -> impl Future<Output = Result<SwitchConfig, AutoThemeError>> + Send;

    /// Replace the stored configuration.
    fn save(&self, config: &SwitchConfig)
    -> impl Future<Output = Result<(), AutoThemeError>> + Send;
}

impl<T: ConfigStore + Send + Sync> ConfigStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<SwitchConfig, AutoThemeError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        config: &SwitchConfig,
    ) -> impl Future<Output = Result<(), AutoThemeError>> + Send {
        (**self).save(config)
    }
}
