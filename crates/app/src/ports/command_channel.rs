//! Command channel port: request/reply transport to the background service.

use std::future::Future;
use std::time::Duration;

use autotheme_domain::command::{Command, StatusReply};
use autotheme_domain::error::TransportError;

/// Sends one [`Command`] and waits for its [`StatusReply`].
///
/// Implementations must not retry; retry policy belongs to callers. They must
/// be safe to call concurrently for independent commands.
pub trait CommandChannel {
    /// Send `command` and wait at most `timeout` for the reply.
    fn send(
        &self,
        command: Command,
        timeout: Duration,
    ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send;

    /// Send `command` with its [default timeout](Command::default_timeout).
    fn send_default(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
        self.send(command, command.default_timeout())
    }
}

impl<T: CommandChannel + Send + Sync> CommandChannel for std::sync::Arc<T> {
    fn send(
        &self,
        command: Command,
        timeout: Duration,
    ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
        (**self).send(command, timeout)
    }

    fn send_default(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
        (**self).send_default(command)
    }
}
