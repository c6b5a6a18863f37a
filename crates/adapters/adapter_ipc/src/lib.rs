//! # autotheme-adapter-ipc
//!
//! Command channel to the background theme service.
//!
//! Each command opens a fresh connection to the service's local TCP port,
//! writes one JSON line (`{"command":"Switch"}`) and reads one line back.
//! The reply line is a bare status token (`Ok`, `NoLocAccess`, `Err:...`).
//!
//! ## Dependency rule
//!
//! Depends on `autotheme_domain` and `autotheme_app` (for the
//! [`CommandChannel`](autotheme_app::ports::CommandChannel) port).

pub mod channel;
pub mod error;

pub use channel::TcpCommandChannel;
pub use error::IpcError;
