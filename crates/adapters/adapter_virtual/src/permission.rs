use std::future::Future;

use serde::Deserialize;

use autotheme_app::ports::GeolocationPermission;
use autotheme_domain::location::GeolocationAccess;

/// Answers every permission request with the same access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedPermission {
    #[default]
    Allowed,
    DeniedWithDefault,
    Denied,
}

impl From<ScriptedPermission> for GeolocationAccess {
    fn from(permission: ScriptedPermission) -> Self {
        match permission {
            ScriptedPermission::Allowed => Self::Allowed,
            ScriptedPermission::DeniedWithDefault => Self::DeniedWithDefault,
            ScriptedPermission::Denied => Self::DeniedOrUnspecified,
        }
    }
}

impl GeolocationPermission for ScriptedPermission {
    fn request_access(&self) -> impl Future<Output = GeolocationAccess> + Send {
        let access = GeolocationAccess::from(*self);
        async move { access }
    }
}
