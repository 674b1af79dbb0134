//! Boundary between the session controller and the connection with a debug engine.
//!
//! A transport owns the connection, frames and decodes engine responses and
//! hands them to the controller as [`Notification`]s carrying normalized
//! [`Message`]s.

pub mod channel;
pub mod replay;

use crate::debugger::command::Command;
use crate::debugger::message::Message;
use std::time::Duration;

/// Engine initiated event delivered to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Engine connected (DBGp `init` packet).
    Connected(Message),
    /// Engine paused after a step or run command.
    Stepped(Message),
    /// Response to a variables request.
    VariablesReceived(Message),
    /// Any other status response (for example `stop` acknowledgement).
    Status(Message),
}

impl Notification {
    pub fn message(&self) -> &Message {
        match self {
            Notification::Connected(msg)
            | Notification::Stepped(msg)
            | Notification::VariablesReceived(msg)
            | Notification::Status(msg) => msg,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Connected(_) => "connected",
            Notification::Stepped(_) => "stepped",
            Notification::VariablesReceived(_) => "variables",
            Notification::Status(_) => "status",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect to engine: {0}")]
    Connect(String),
    #[error("send `{command}`: {reason}")]
    Send { command: Command, reason: String },
    #[error("disconnect from engine: {0}")]
    Disconnect(String),
    #[error("not connected to engine")]
    NotConnected,
    #[error("engine closed the connection")]
    Closed,
    #[error("no response to `{command}` in {elapsed:?}")]
    Timeout { command: Command, elapsed: Duration },
}

/// Connection with a debug engine.
pub trait Transport {
    /// Start accepting the engine connection.
    /// Completion is reported by a [`Notification::Connected`].
    fn connect(&mut self) -> Result<(), TransportError>;

    fn disconnect(&mut self) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    fn send(&mut self, command: &Command) -> Result<(), TransportError>;

    /// Return next received notification.
    /// With `None` timeout never waits, otherwise waits at most `timeout` for a notification.
    fn poll(&mut self, timeout: Option<Duration>) -> Result<Option<Notification>, TransportError>;
}
