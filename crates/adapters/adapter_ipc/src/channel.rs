//! TCP implementation of the command channel port.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::Instant;

use autotheme_app::ports::CommandChannel;
use autotheme_domain::command::{COMMAND_TIMEOUT, Command, SWITCH_TIMEOUT, StatusReply};
use autotheme_domain::error::TransportError;

use crate::error::IpcError;

/// Address the service listens on unless configured otherwise.
pub const DEFAULT_ADDR: &str = "127.0.0.1:54345";

#[derive(Serialize)]
struct Request {
    command: Command,
}

/// One-shot request/reply channel over a local TCP connection.
///
/// Holds no connection between commands, so concurrent sends never share a
/// socket. [`send_default`](CommandChannel::send_default) uses the timeouts
/// configured with [`with_timeouts`](Self::with_timeouts).
#[derive(Debug, Clone)]
pub struct TcpCommandChannel {
    addr: String,
    switch_timeout: Duration,
    command_timeout: Duration,
}

impl TcpCommandChannel {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            switch_timeout: SWITCH_TIMEOUT,
            command_timeout: COMMAND_TIMEOUT,
        }
    }

    /// Override the reply timeouts for `Switch` and for every other command.
    #[must_use]
    pub fn with_timeouts(mut self, switch: Duration, command: Duration) -> Self {
        self.switch_timeout = switch;
        self.command_timeout = command;
        self
    }

    #[must_use]
    pub fn timeout_for(&self, command: Command) -> Duration {
        match command {
            Command::Switch => self.switch_timeout,
            _ => self.command_timeout,
        }
    }

    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn exchange(&self, command: Command) -> Result<StatusReply, IpcError> {
        let mut payload = serde_json::to_vec(&Request { command }).map_err(IpcError::Encode)?;
        payload.push(b'\n');

        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(&payload).await?;
        stream.flush().await?;

        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).await?;
        if line.trim().is_empty() {
            return Err(IpcError::EmptyReply);
        }
        Ok(StatusReply::parse(&line))
    }
}

impl Default for TcpCommandChannel {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR)
    }
}

impl CommandChannel for TcpCommandChannel {
    fn send(
        &self,
        command: Command,
        timeout: Duration,
    ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
        async move {
            tracing::debug!(%command, addr = %self.addr, ?timeout, "sending command");
            let started = Instant::now();
            let reply = match tokio::time::timeout(timeout, self.exchange(command)).await {
                Ok(result) => result.map_err(IpcError::into_transport)?,
                Err(_) => return Err(TransportError::Timeout { command, timeout }),
            };
            tracing::debug!(%command, status = %reply, elapsed = ?started.elapsed(), "service replied");
            Ok(reply)
        }
    }

    fn send_default(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<StatusReply, TransportError>> + Send {
        self.send(command, self.timeout_for(command))
    }
}
