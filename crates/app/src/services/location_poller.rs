//! Location poller: resolves the device position, bounded in time.
//!
//! The background service owns the location cache and fills it once it has
//! access to the OS location service. The poller asks the service for access,
//! waits for the cache to be populated, confirms the OS permission and looks
//! up a place name for display.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use autotheme_domain::command::{Command, StatusReply};
use autotheme_domain::error::AutoThemeError;
use autotheme_domain::location::{
    Coordinates, GeolocationAccess, LocationData, ResolvedLocation,
};

use crate::ports::{CommandChannel, GeolocationPermission, LocationCache, PlaceResolver};

/// Poll budget for the location cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of cache reads before giving up.
    pub max_attempts: u32,
    /// Delay between two reads.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(1),
        }
    }
}

/// Fires when the operation that started a lookup has been superseded.
///
/// Wraps a `watch` receiver on the scheduler's transition counter: any change
/// after the lookup started cancels it.
pub struct Cancellation(Option<watch::Receiver<u64>>);

impl Cancellation {
    #[must_use]
    pub fn new(receiver: watch::Receiver<u64>) -> Self {
        Self(Some(receiver))
    }

    /// A token that never fires.
    #[must_use]
    pub fn never() -> Self {
        Self(None)
    }

    /// Resolve once cancelled. A dropped sender counts as cancellation.
    pub async fn cancelled(&mut self) {
        match &mut self.0 {
            Some(receiver) => {
                let _ = receiver.changed().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Anything that can turn "device location mode" into a usable position.
pub trait DeviceLocator {
    fn locate(
        &self,
        cancel: Cancellation,
    ) -> impl Future<Output = Result<ResolvedLocation, AutoThemeError>> + Send;
}

/// Default [`DeviceLocator`]: service access check, bounded cache poll,
/// OS permission check, best-effort place name.
pub struct LocationPoller<C, L, G, N> {
    channel: C,
    cache: L,
    permission: G,
    resolver: N,
    policy: PollPolicy,
}

impl<C, L, G, N> LocationPoller<C, L, G, N>
where
    C: CommandChannel + Sync,
    L: LocationCache + Sync,
    G: GeolocationPermission + Sync,
    N: PlaceResolver + Sync,
{
    pub fn new(channel: C, cache: L, permission: G, resolver: N, policy: PollPolicy) -> Self {
        Self {
            channel,
            cache,
            permission,
            resolver,
            policy,
        }
    }

    /// Resolve the device position.
    ///
    /// # Errors
    ///
    /// - [`AutoThemeError::PermissionDenied`] when the service reports no
    ///   location access (no polling happens) or the OS denies permission
    /// - [`AutoThemeError::LocationTimeout`] when the cache stays empty for
    ///   the whole poll budget
    /// - [`AutoThemeError::Transport`] when the access check gets no reply
    /// - [`AutoThemeError::Cancelled`] when `cancel` fires while polling
    #[tracing::instrument(skip_all, fields(max_attempts = self.policy.max_attempts))]
    pub async fn resolve(
        &self,
        mut cancel: Cancellation,
    ) -> Result<ResolvedLocation, AutoThemeError> {
        let reply = self.channel.send_default(Command::LocationAccess).await?;
        match reply {
            StatusReply::NoLocationAccess => {
                tracing::info!("service has no location access");
                return Err(AutoThemeError::PermissionDenied);
            }
            StatusReply::Ok => {}
            StatusReply::Error(status) => {
                tracing::debug!(%status, "location access check answered with an error, polling anyway");
            }
        }

        let fix = self.wait_for_fix(&mut cancel).await?;

        let access = self.permission.request_access().await;
        if access == GeolocationAccess::DeniedWithDefault {
            tracing::debug!("geolocation denied, using the cached default position");
        }
        if !access.is_usable() {
            tracing::info!(?access, "geolocation permission denied");
            return Err(AutoThemeError::PermissionDenied);
        }

        let (coordinates, last_update) = match fix {
            Some(LocationData {
                latitude,
                longitude,
                last_update: Some(last_update),
            }) => (
                Coordinates {
                    latitude,
                    longitude,
                },
                last_update,
            ),
            _ => {
                tracing::warn!(
                    attempts = self.policy.max_attempts,
                    "location data did not arrive in time"
                );
                return Err(AutoThemeError::LocationTimeout {
                    attempts: self.policy.max_attempts,
                });
            }
        };

        let place_name = match self.resolver.resolve(coordinates).await {
            Ok(name) => Some(name),
            Err(err) => {
                tracing::warn!(error = %err, "place name lookup failed");
                None
            }
        };

        Ok(ResolvedLocation {
            coordinates,
            place_name,
            last_update,
        })
    }

    /// Read the cache until it holds a fix or the budget runs out.
    ///
    /// Reads are spaced `policy.interval` apart; there is no sleep after the
    /// last one. A failing read counts as an empty one.
    async fn wait_for_fix(
        &self,
        cancel: &mut Cancellation,
    ) -> Result<Option<LocationData>, AutoThemeError> {
        for attempt in 1..=self.policy.max_attempts {
            match self.cache.read().await {
                Ok(data) if data.is_populated() => {
                    tracing::debug!(attempt, "location data available");
                    return Ok(Some(data));
                }
                Ok(_) => tracing::debug!(attempt, "location data not populated yet"),
                Err(err) => tracing::warn!(attempt, error = %err, "failed to read location data"),
            }

            if attempt < self.policy.max_attempts {
                tokio::select! {
                    () = tokio::time::sleep(self.policy.interval) => {}
                    () = cancel.cancelled() => {
                        tracing::debug!(attempt, "location poll cancelled");
                        return Err(AutoThemeError::Cancelled);
                    }
                }
            }
        }
        Ok(None)
    }
}

impl<C, L, G, N> DeviceLocator for LocationPoller<C, L, G, N>
where
    C: CommandChannel + Send + Sync,
    L: LocationCache + Send + Sync,
    G: GeolocationPermission + Send + Sync,
    N: PlaceResolver + Send + Sync,
{
    fn locate(
        &self,
        cancel: Cancellation,
    ) -> impl Future<Output = Result<ResolvedLocation, AutoThemeError>> + Send {
        self.resolve(cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotheme_domain::error::TransportError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ── Fakes ──────────────────────────────────────────────────────

    struct ScriptedChannel {
        reply: StatusReply,
        sent: Mutex<Vec<Command>>,
    }

    impl ScriptedChannel {
        fn replying(reply: StatusReply) -> Self {
            Self {
                reply,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandChannel for ScriptedChannel {
        fn send(
            &self,
            command: Command,
            _timeout: Duration,
        ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
            self.sent.lock().unwrap().push(command);
            let reply = self.reply.clone();
            async { Ok(reply) }
        }
    }

    struct UnreachableChannel;

    impl CommandChannel for UnreachableChannel {
        fn send(
            &self,
            command: Command,
            timeout: Duration,
        ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
            async move { Err(TransportError::Timeout { command, timeout }) }
        }
    }

    /// Empty for the first `empty_reads` reads, then populated.
    struct FillingCache {
        empty_reads: u32,
        reads: AtomicU32,
    }

    impl FillingCache {
        fn after(empty_reads: u32) -> Self {
            Self {
                empty_reads,
                reads: AtomicU32::new(0),
            }
        }

        fn never() -> Self {
            Self::after(u32::MAX)
        }

        fn reads(&self) -> u32 {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl LocationCache for FillingCache {
        fn read(&self) -> impl Future<Output = Result<LocationData, AutoThemeError>> + Send {
            let previous = self.reads.fetch_add(1, Ordering::SeqCst);
            let data = if previous < self.empty_reads {
                LocationData::default()
            } else {
                LocationData {
                    latitude: 48.137,
                    longitude: 11.575,
                    last_update: Some(autotheme_domain::time::now()),
                }
            };
            async { Ok(data) }
        }
    }

    struct Permission(GeolocationAccess);

    impl GeolocationPermission for Permission {
        fn request_access(&self) -> impl Future<Output = GeolocationAccess> + Send {
            let access = self.0;
            async move { access }
        }
    }

    struct Resolver(Option<&'static str>);

    impl PlaceResolver for Resolver {
        fn resolve(
            &self,
            _coordinates: Coordinates,
        ) -> impl Future<Output = Result<String, AutoThemeError>> + Send {
            let name = self.0;
            async move {
                name.map(str::to_string).ok_or_else(|| {
                    AutoThemeError::Storage("geocoder offline".into())
                })
            }
        }
    }

    fn poller<C: CommandChannel + Sync>(
        channel: C,
        cache: FillingCache,
        access: GeolocationAccess,
    ) -> LocationPoller<C, FillingCache, Permission, Resolver> {
        LocationPoller::new(
            channel,
            cache,
            Permission(access),
            Resolver(Some("Munich")),
            PollPolicy::default(),
        )
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_resolve_immediately_when_cache_populated() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::after(0),
            GeolocationAccess::Allowed,
        );
        let started = tokio::time::Instant::now();

        let location = p.resolve(Cancellation::never()).await.unwrap();

        assert_eq!(location.place_name.as_deref(), Some("Munich"));
        assert!((location.coordinates.latitude - 48.137).abs() < 1e-9);
        assert_eq!(p.cache.reads(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(
            *p.channel.sent.lock().unwrap(),
            vec![Command::LocationAccess]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_for_service_to_fill_cache() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::after(2),
            GeolocationAccess::Allowed,
        );
        let started = tokio::time::Instant::now();

        p.resolve(Cancellation::never()).await.unwrap();

        assert_eq!(p.cache.reads(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_after_exactly_max_attempts() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::never(),
            GeolocationAccess::Allowed,
        );
        let started = tokio::time::Instant::now();

        let result = p.resolve(Cancellation::never()).await;

        assert!(matches!(
            result,
            Err(AutoThemeError::LocationTimeout { attempts: 5 })
        ));
        assert_eq!(p.cache.reads(), 5);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn should_deny_without_polling_when_service_has_no_access() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::NoLocationAccess),
            FillingCache::after(0),
            GeolocationAccess::Allowed,
        );

        let result = p.resolve(Cancellation::never()).await;

        assert!(matches!(result, Err(AutoThemeError::PermissionDenied)));
        assert_eq!(p.cache.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_surface_transport_error_from_access_check() {
        let p = poller(
            UnreachableChannel,
            FillingCache::after(0),
            GeolocationAccess::Allowed,
        );

        let result = p.resolve(Cancellation::never()).await;

        assert!(matches!(
            result,
            Err(AutoThemeError::Transport(TransportError::Timeout {
                command: Command::LocationAccess,
                ..
            }))
        ));
        assert_eq!(p.cache.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_accept_denied_permission_with_default_position() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::after(0),
            GeolocationAccess::DeniedWithDefault,
        );

        let location = p.resolve(Cancellation::never()).await.unwrap();
        assert_eq!(location.place_name.as_deref(), Some("Munich"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_deny_when_os_permission_unspecified() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::after(0),
            GeolocationAccess::DeniedOrUnspecified,
        );

        let result = p.resolve(Cancellation::never()).await;
        assert!(matches!(result, Err(AutoThemeError::PermissionDenied)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_prefer_permission_denial_over_timeout() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::never(),
            GeolocationAccess::DeniedOrUnspecified,
        );

        let result = p.resolve(Cancellation::never()).await;
        assert!(matches!(result, Err(AutoThemeError::PermissionDenied)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_coordinates_when_place_lookup_fails() {
        let p = LocationPoller::new(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::after(0),
            Permission(GeolocationAccess::Allowed),
            Resolver(None),
            PollPolicy::default(),
        );

        let location = p.resolve(Cancellation::never()).await.unwrap();

        assert!(location.place_name.is_none());
        assert!((location.coordinates.longitude - 11.575).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_polling_when_cancelled() {
        let p = poller(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::never(),
            GeolocationAccess::Allowed,
        );
        let (tx, rx) = watch::channel(0_u64);

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            tx.send_replace(1);
        };
        let (result, ()) = tokio::join!(p.resolve(Cancellation::new(rx)), canceller);

        assert!(matches!(result, Err(AutoThemeError::Cancelled)));
        assert_eq!(p.cache.reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_honour_custom_poll_policy() {
        let p = LocationPoller::new(
            ScriptedChannel::replying(StatusReply::Ok),
            FillingCache::never(),
            Permission(GeolocationAccess::Allowed),
            Resolver(Some("Munich")),
            PollPolicy {
                max_attempts: 3,
                interval: Duration::from_millis(200),
            },
        );
        let started = tokio::time::Instant::now();

        let result = p.resolve(Cancellation::never()).await;

        assert!(matches!(
            result,
            Err(AutoThemeError::LocationTimeout { attempts: 3 })
        ));
        assert_eq!(p.cache.reads(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(400));
    }
}
