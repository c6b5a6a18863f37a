//! Theme-switch scheduler: the mode state machine behind the settings page.
//!
//! The scheduler owns the session's [`SwitchConfig`] and the committed flag.
//! User actions arrive as method calls; each one updates the state, recomputes
//! the effective sun times where that makes sense and publishes
//! [`SchedulerEvent`]s for observers. [`ThemeSwitchScheduler::apply`] is the
//! only path that sends [`Command::Switch`].
//!
//! All methods take `&self` so a UI can keep issuing actions while a location
//! lookup or an apply is awaiting the service:
//! - at most one apply is in flight; a second one is rejected
//! - every mode change bumps a transition counter that cancels a running
//!   location lookup, and results of superseded lookups are dropped
//! - edits made while an apply is in flight keep the committed flag unset

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use autotheme_domain::command::Command;
use autotheme_domain::error::AutoThemeError;
use autotheme_domain::location::{Coordinates, ResolvedLocation};
use autotheme_domain::offset::{OffsetInput, Offsets};
use autotheme_domain::settings::{SwitchConfig, SwitchMode};
use autotheme_domain::state::{ApplyWarning, PendingReason, SchedulerEvent, SchedulerState};
use autotheme_domain::sun_times::EffectiveSunTimes;
use autotheme_domain::time::{parse_time_of_day, today};

use crate::ports::{AstronomicalClock, CommandChannel, ConfigStore, EventPublisher, PowerStatus};
use crate::services::location_poller::{Cancellation, DeviceLocator};
use crate::services::sun_time_calculator::SunTimeCalculator;

/// Result of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The times the service was asked to switch by.
    pub sun_times: EffectiveSunTimes,
    pub warning: Option<ApplyWarning>,
}

struct Session {
    config: SwitchConfig,
    state: SchedulerState,
    location: Option<ResolvedLocation>,
    sun_times: Option<EffectiveSunTimes>,
    committed: bool,
    /// Bumped on every edit to the configuration.
    revision: u64,
    /// Bumped on every mode change.
    transition: u64,
}

/// Orchestrates mode selection, location lookup, sun-time computation and
/// the `Switch` command.
pub struct ThemeSwitchScheduler<S, C, R, A, W, P> {
    store: S,
    channel: C,
    locator: R,
    calculator: SunTimeCalculator<A>,
    power: W,
    publisher: P,
    session: Mutex<Session>,
    apply_gate: tokio::sync::Mutex<()>,
    transitions: watch::Sender<u64>,
}

impl<S, C, R, A, W, P> ThemeSwitchScheduler<S, C, R, A, W, P>
where
    S: ConfigStore,
    C: CommandChannel,
    R: DeviceLocator,
    A: AstronomicalClock,
    W: PowerStatus,
    P: EventPublisher,
{
    /// Start a session from an already loaded configuration.
    ///
    /// A configuration that breaks its invariants (inconsistent flags or
    /// out-of-range coordinates) is repaired instead of rejected.
    pub fn new(
        mut config: SwitchConfig,
        store: S,
        channel: C,
        locator: R,
        clock: A,
        power: W,
        publisher: P,
    ) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, mode = %config.mode, "repairing stored configuration");
            config.repair();
        }
        let state = SchedulerState::restore(&config);
        let calculator = SunTimeCalculator::new(clock);
        let sun_times = match state {
            SchedulerState::FixedTimes => Some(calculator.compute(&config, None, today())),
            SchedulerState::Coordinates => {
                Some(calculator.compute(&config, Some(config.coordinates()), today()))
            }
            _ => None,
        };
        let (transitions, _) = watch::channel(0);

        Self {
            store,
            channel,
            locator,
            calculator,
            power,
            publisher,
            session: Mutex::new(Session {
                config,
                state,
                location: None,
                sun_times,
                committed: false,
                revision: 0,
                transition: 0,
            }),
            apply_gate: tokio::sync::Mutex::new(()),
            transitions,
        }
    }

    /// Load the configuration from `store` and start a session.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the configuration cannot be loaded.
    pub async fn load(
        store: S,
        channel: C,
        locator: R,
        clock: A,
        power: W,
        publisher: P,
    ) -> Result<Self, AutoThemeError> {
        let config = store.load().await?;
        Ok(Self::new(
            config, store, channel, locator, clock, power, publisher,
        ))
    }

    pub fn state(&self) -> SchedulerState {
        self.session().state
    }

    pub fn config(&self) -> SwitchConfig {
        self.session().config.clone()
    }

    /// Whether the last apply succeeded and nothing was edited since.
    pub fn is_committed(&self) -> bool {
        self.session().committed
    }

    pub fn sun_times(&self) -> Option<EffectiveSunTimes> {
        self.session().sun_times
    }

    pub fn location(&self) -> Option<ResolvedLocation> {
        self.session().location.clone()
    }

    /// Turn automatic switching off. Persists immediately, never sends
    /// `Switch` and leaves autostart alone.
    ///
    /// # Errors
    ///
    /// Returns a storage error if saving fails.
    #[tracing::instrument(skip(self))]
    pub async fn select_disabled(&self) -> Result<(), AutoThemeError> {
        self.persist_mode(SwitchMode::Disabled).await?;
        {
            let mut s = self.session();
            self.begin_transition(&mut s);
            s.config.enter_mode(SwitchMode::Disabled);
            s.state = SchedulerState::Disabled;
            s.location = None;
            s.sun_times = None;
            mark_edited(&mut s);
        }
        self.emit([SchedulerEvent::StateChanged {
            state: SchedulerState::Disabled,
        }])
        .await;
        Ok(())
    }

    /// Switch by the fixed clock times. Takes effect on the next apply.
    #[tracing::instrument(skip(self))]
    pub async fn select_fixed_times(&self) -> EffectiveSunTimes {
        let sun_times = {
            let mut s = self.session();
            self.begin_transition(&mut s);
            s.config.enter_mode(SwitchMode::FixedTimes);
            s.state = SchedulerState::FixedTimes;
            s.location = None;
            mark_edited(&mut s);
            let sun_times = self.calculator.compute(&s.config, None, today());
            s.sun_times = Some(sun_times);
            sun_times
        };
        self.emit([
            SchedulerEvent::StateChanged {
                state: SchedulerState::FixedTimes,
            },
            SchedulerEvent::SunTimesUpdated { sun_times },
        ])
        .await;
        sun_times
    }

    /// Switch by sun times at the stored coordinates. Persists the mode.
    ///
    /// # Errors
    ///
    /// Returns a storage error if saving fails.
    #[tracing::instrument(skip(self))]
    pub async fn select_coordinates(&self) -> Result<EffectiveSunTimes, AutoThemeError> {
        self.persist_mode(SwitchMode::Coordinates).await?;
        let sun_times = {
            let mut s = self.session();
            self.begin_transition(&mut s);
            s.config.enter_mode(SwitchMode::Coordinates);
            s.state = SchedulerState::Coordinates;
            s.location = None;
            mark_edited(&mut s);
            let coordinates = s.config.coordinates();
            let sun_times = self.calculator.compute(&s.config, Some(coordinates), today());
            s.sun_times = Some(sun_times);
            sun_times
        };
        self.emit([
            SchedulerEvent::StateChanged {
                state: SchedulerState::Coordinates,
            },
            SchedulerEvent::SunTimesUpdated { sun_times },
        ])
        .await;
        Ok(sun_times)
    }

    /// Replace the manual coordinates. Returns the recomputed sun times when
    /// coordinates mode is active.
    ///
    /// # Errors
    ///
    /// Returns [`AutoThemeError::Validation`] for out-of-range values; nothing
    /// is changed in that case.
    pub async fn set_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<EffectiveSunTimes>, AutoThemeError> {
        let coordinates = Coordinates::new(latitude, longitude)?;
        let sun_times = {
            let mut s = self.session();
            s.config.set_coordinates(coordinates);
            mark_edited(&mut s);
            if s.config.mode == SwitchMode::Coordinates {
                s.sun_times = self.effective_times(&s);
                s.sun_times
            } else {
                None
            }
        };
        if let Some(sun_times) = sun_times {
            self.emit([SchedulerEvent::SunTimesUpdated { sun_times }])
                .await;
        }
        Ok(sun_times)
    }

    /// Switch by sun times at the device position and resolve it.
    ///
    /// The mode is persisted before the session switches and the lookup
    /// starts. Calling this again
    /// retries a lookup that timed out or was denied.
    ///
    /// # Errors
    ///
    /// - [`AutoThemeError::PermissionDenied`]: state becomes pending/no-access
    /// - [`AutoThemeError::LocationTimeout`]: state becomes pending/timed-out
    /// - [`AutoThemeError::Cancelled`]: another mode was selected meanwhile;
    ///   the result was dropped and state left to the newer action
    /// - transport and storage errors are surfaced as-is
    #[tracing::instrument(skip(self))]
    pub async fn select_device_location(&self) -> Result<ResolvedLocation, AutoThemeError> {
        let pending = SchedulerState::DeviceLocationPending(PendingReason::Searching);
        self.persist_mode(SwitchMode::DeviceLocation).await?;
        let (transition, cancel) = {
            let mut s = self.session();
            let transition = self.begin_transition(&mut s);
            let cancel = Cancellation::new(self.transitions.subscribe());
            s.config.enter_mode(SwitchMode::DeviceLocation);
            s.state = pending;
            s.location = None;
            s.sun_times = None;
            mark_edited(&mut s);
            (transition, cancel)
        };
        self.emit([SchedulerEvent::StateChanged { state: pending }])
            .await;

        let result = self.locator.locate(cancel).await;

        let (events, outcome) = {
            let mut s = self.session();
            if s.transition != transition {
                tracing::debug!("dropping result of a superseded location lookup");
                return Err(AutoThemeError::Cancelled);
            }
            match result {
                Ok(location) => {
                    let sun_times =
                        self.calculator
                            .compute(&s.config, Some(location.coordinates), today());
                    s.state = SchedulerState::DeviceLocationResolved;
                    s.location = Some(location.clone());
                    s.sun_times = Some(sun_times);
                    (
                        vec![
                            SchedulerEvent::StateChanged {
                                state: SchedulerState::DeviceLocationResolved,
                            },
                            SchedulerEvent::SunTimesUpdated { sun_times },
                        ],
                        Ok(location),
                    )
                }
                Err(err) => {
                    let reason = match &err {
                        AutoThemeError::PermissionDenied => PendingReason::NoAccess,
                        AutoThemeError::LocationTimeout { .. } => PendingReason::TimedOut,
                        _ => PendingReason::Failed,
                    };
                    let state = SchedulerState::DeviceLocationPending(reason);
                    s.state = state;
                    (vec![SchedulerEvent::StateChanged { state }], Err(err))
                }
            }
        };
        self.emit(events).await;
        outcome
    }

    /// Replace the fixed clock times from time-picker input.
    ///
    /// # Errors
    ///
    /// Returns [`AutoThemeError::Validation`] if either entry is not `HH:MM`;
    /// nothing is changed in that case.
    pub fn set_fixed_times(&self, sunrise: &str, sunset: &str) -> Result<(), AutoThemeError> {
        let sunrise = parse_time_of_day(sunrise)?;
        let sunset = parse_time_of_day(sunset)?;
        let mut s = self.session();
        s.config.sunrise = sunrise;
        s.config.sunset = sunset;
        mark_edited(&mut s);
        Ok(())
    }

    /// Store new offsets from the two offset boxes and apply them.
    ///
    /// # Errors
    ///
    /// Returns [`AutoThemeError::Validation`] before anything is changed or
    /// sent if either box is invalid, otherwise whatever [`apply`](Self::apply)
    /// returns.
    #[tracing::instrument(skip(self))]
    pub async fn set_offsets(
        &self,
        sunrise: &OffsetInput,
        sunset: &OffsetInput,
    ) -> Result<ApplyOutcome, AutoThemeError> {
        let offsets = Offsets::parse(sunrise, sunset)?;
        let sun_times = {
            let mut s = self.session();
            s.config.set_offsets(offsets);
            mark_edited(&mut s);
            s.sun_times = self.effective_times(&s);
            s.sun_times
        };
        if let Some(sun_times) = sun_times {
            self.emit([SchedulerEvent::SunTimesUpdated { sun_times }])
                .await;
        }
        self.apply().await
    }

    /// Commit: recompute the effective times, persist the configuration and
    /// ask the service to switch.
    ///
    /// The configuration is saved before `Switch` is sent, so a failed send
    /// never loses edits; the committed flag stays unset and apply can simply
    /// be retried. With the energy saver on the apply still succeeds but
    /// carries [`ApplyWarning::PowerSaverActive`] and leaves the flag unset.
    ///
    /// # Errors
    ///
    /// - [`AutoThemeError::ApplyInProgress`] if another apply is awaiting its reply
    /// - [`AutoThemeError::SwitchingDisabled`] in the disabled state
    /// - [`AutoThemeError::PermissionDenied`] / [`AutoThemeError::LocationUnresolved`]
    ///   while device location is pending
    /// - [`AutoThemeError::SwitchRejected`] with the raw status for a non-`Ok` reply
    /// - [`AutoThemeError::Transport`] when the service does not answer
    /// - a storage error if saving fails (nothing is sent)
    #[tracing::instrument(skip(self))]
    pub async fn apply(&self) -> Result<ApplyOutcome, AutoThemeError> {
        let Ok(_in_flight) = self.apply_gate.try_lock() else {
            tracing::debug!("apply rejected, a switch is already in flight");
            return Err(AutoThemeError::ApplyInProgress);
        };

        let (config, revision, sun_times) = {
            let mut s = self.session();
            match s.state {
                SchedulerState::Disabled => return Err(AutoThemeError::SwitchingDisabled),
                SchedulerState::DeviceLocationPending(PendingReason::NoAccess) => {
                    return Err(AutoThemeError::PermissionDenied);
                }
                SchedulerState::DeviceLocationPending(_) => {
                    return Err(AutoThemeError::LocationUnresolved);
                }
                SchedulerState::FixedTimes
                | SchedulerState::Coordinates
                | SchedulerState::DeviceLocationResolved => {}
            }
            let sun_times = self
                .effective_times(&s)
                .ok_or(AutoThemeError::LocationUnresolved)?;
            s.sun_times = Some(sun_times);
            (s.config.clone(), s.revision, sun_times)
        };
        self.emit([SchedulerEvent::SunTimesUpdated { sun_times }])
            .await;

        self.store.save(&config).await?;

        let status = match self.channel.send_default(Command::Switch).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "theme switch got no reply");
                self.emit([SchedulerEvent::ApplyFailed {
                    reason: err.to_string(),
                }])
                .await;
                return Err(err.into());
            }
        };
        if !status.is_ok() {
            tracing::warn!(%status, "service rejected theme switch");
            self.emit([SchedulerEvent::ApplyFailed {
                reason: status.to_string(),
            }])
            .await;
            return Err(AutoThemeError::SwitchRejected {
                status: status.as_token().to_string(),
            });
        }

        let warning = self
            .power
            .energy_saver_active()
            .then_some(ApplyWarning::PowerSaverActive);
        {
            let mut s = self.session();
            if s.revision == revision && warning.is_none() {
                s.committed = true;
            }
        }
        tracing::info!(?warning, "theme switch applied");
        self.emit([SchedulerEvent::Committed { warning }]).await;

        Ok(ApplyOutcome { sun_times, warning })
    }

    /// Save the configuration as it will look in `mode`. The session only
    /// switches once this succeeded, so a failed save leaves it untouched.
    async fn persist_mode(&self, mode: SwitchMode) -> Result<(), AutoThemeError> {
        let mut candidate = self.session().config.clone();
        candidate.enter_mode(mode);
        self.store.save(&candidate).await
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new mode transition, cancelling any running lookup.
    fn begin_transition(&self, s: &mut Session) -> u64 {
        s.transition += 1;
        self.transitions.send_replace(s.transition);
        s.transition
    }

    fn effective_times(&self, s: &Session) -> Option<EffectiveSunTimes> {
        let location = match s.config.mode {
            SwitchMode::Disabled => return None,
            SwitchMode::FixedTimes => None,
            SwitchMode::Coordinates => Some(s.config.coordinates()),
            SwitchMode::DeviceLocation => Some(s.location.as_ref()?.coordinates),
        };
        Some(self.calculator.compute(&s.config, location, today()))
    }

    async fn emit(&self, events: impl IntoIterator<Item = SchedulerEvent>) {
        for event in events {
            if let Err(err) = self.publisher.publish(event).await {
                tracing::warn!(error = %err, "failed to publish scheduler event");
            }
        }
    }
}

fn mark_edited(s: &mut Session) {
    s.revision += 1;
    s.committed = false;
}
