//! Autostart controller: registers the background service to start with the
//! user session when automatic switching is turned on.

use autotheme_domain::command::{Command, StatusReply};
use autotheme_domain::error::AutoThemeError;
use autotheme_domain::settings::SwitchConfig;

use crate::ports::{CommandChannel, ConfigStore};

/// Application service for the autostart toggle.
///
/// Neither operation rolls back local configuration when the service
/// refuses the registration change.
pub struct AutostartController<S, C> {
    store: S,
    channel: C,
}

impl<S: ConfigStore, C: CommandChannel> AutostartController<S, C> {
    pub fn new(store: S, channel: C) -> Self {
        Self { store, channel }
    }

    /// Persist `auto_switching_enabled = true`, then send `AddAutostart`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if saving fails (no command is sent),
    /// [`AutoThemeError::Transport`] if the service does not answer, or
    /// [`AutoThemeError::CommandRejected`] carrying the raw status.
    #[tracing::instrument(skip_all)]
    pub async fn enable(&self, config: &mut SwitchConfig) -> Result<(), AutoThemeError> {
        config.auto_switching_enabled = true;
        self.store.save(config).await?;
        self.dispatch(Command::AddAutostart).await
    }

    /// Send `RemoveAutostart`.
    ///
    /// # Errors
    ///
    /// Returns [`AutoThemeError::Transport`] if the service does not answer,
    /// or [`AutoThemeError::CommandRejected`] carrying the raw status.
    #[tracing::instrument(skip_all)]
    pub async fn disable(&self) -> Result<(), AutoThemeError> {
        self.dispatch(Command::RemoveAutostart).await
    }

    async fn dispatch(&self, command: Command) -> Result<(), AutoThemeError> {
        match self.channel.send_default(command).await? {
            StatusReply::Ok => {
                tracing::info!(%command, "autostart updated");
                Ok(())
            }
            other => {
                tracing::warn!(%command, status = %other, "service rejected autostart change");
                Err(AutoThemeError::CommandRejected {
                    command,
                    status: other.as_token().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotheme_domain::error::TransportError;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct InMemoryStore {
        saved: Mutex<Vec<SwitchConfig>>,
        fail: bool,
    }

    impl ConfigStore for InMemoryStore {
        fn load(&self) -> impl Future<Output = Result<SwitchConfig, AutoThemeError>> + Send {
            let config = self.saved.lock().unwrap().last().cloned().unwrap_or_default();
            async { Ok(config) }
        }

        fn save(
            &self,
            config: &SwitchConfig,
        ) -> impl Future<Output = Result<(), AutoThemeError>> + Send {
            let result = if self.fail {
                Err(AutoThemeError::Storage("disk full".into()))
            } else {
                self.saved.lock().unwrap().push(config.clone());
                Ok(())
            };
            async { result }
        }
    }

    struct RecordingChannel {
        reply: Result<StatusReply, ()>,
        sent: Mutex<Vec<(Command, Duration)>>,
    }

    impl RecordingChannel {
        fn replying(reply: StatusReply) -> Self {
            Self {
                reply: Ok(reply),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: Err(()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn commands(&self) -> Vec<Command> {
            self.sent.lock().unwrap().iter().map(|(c, _)| *c).collect()
        }
    }

    impl CommandChannel for RecordingChannel {
        fn send(
            &self,
            command: Command,
            timeout: Duration,
        ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
            self.sent.lock().unwrap().push((command, timeout));
            let reply = self
                .reply
                .clone()
                .map_err(|()| TransportError::Timeout { command, timeout });
            async { reply }
        }
    }

    #[tokio::test]
    async fn should_persist_then_add_autostart() {
        let ctl = AutostartController::new(
            InMemoryStore::default(),
            RecordingChannel::replying(StatusReply::Ok),
        );
        let mut config = SwitchConfig::default();

        ctl.enable(&mut config).await.unwrap();

        assert!(config.auto_switching_enabled);
        assert!(ctl.store.saved.lock().unwrap()[0].auto_switching_enabled);
        assert_eq!(
            *ctl.channel.sent.lock().unwrap(),
            vec![(Command::AddAutostart, Duration::from_secs(5))]
        );
    }

    #[tokio::test]
    async fn should_keep_local_enable_when_service_rejects() {
        let ctl = AutostartController::new(
            InMemoryStore::default(),
            RecordingChannel::replying(StatusReply::Error("Err:Registry".to_string())),
        );
        let mut config = SwitchConfig::default();

        let result = ctl.enable(&mut config).await;

        match result {
            Err(AutoThemeError::CommandRejected { command, status }) => {
                assert_eq!(command, Command::AddAutostart);
                assert_eq!(status, "Err:Registry");
            }
            other => panic!("expected CommandRejected, got {other:?}"),
        }
        assert!(config.auto_switching_enabled);
        assert_eq!(ctl.store.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_not_send_when_save_fails() {
        let ctl = AutostartController::new(
            InMemoryStore {
                fail: true,
                ..InMemoryStore::default()
            },
            RecordingChannel::replying(StatusReply::Ok),
        );
        let mut config = SwitchConfig::default();

        let result = ctl.enable(&mut config).await;

        assert!(matches!(result, Err(AutoThemeError::Storage(_))));
        assert!(ctl.channel.commands().is_empty());
    }

    #[tokio::test]
    async fn should_remove_autostart() {
        let ctl = AutostartController::new(
            InMemoryStore::default(),
            RecordingChannel::replying(StatusReply::Ok),
        );

        ctl.disable().await.unwrap();

        assert_eq!(ctl.channel.commands(), vec![Command::RemoveAutostart]);
        assert!(ctl.store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_report_no_location_status_as_rejection() {
        let ctl = AutostartController::new(
            InMemoryStore::default(),
            RecordingChannel::replying(StatusReply::NoLocationAccess),
        );

        let result = ctl.disable().await;

        assert!(matches!(
            result,
            Err(AutoThemeError::CommandRejected { ref status, .. }) if status == "NoLocAccess"
        ));
    }

    #[tokio::test]
    async fn should_surface_transport_error() {
        let ctl = AutostartController::new(
            InMemoryStore::default(),
            RecordingChannel::unreachable(),
        );

        let result = ctl.disable().await;

        assert!(matches!(
            result,
            Err(AutoThemeError::Transport(TransportError::Timeout { .. }))
        ));
    }
}
