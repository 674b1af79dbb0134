//! In-process transport built on message passing.
//!
//! Controller side is a [`ChannelTransport`], engine side is an [`EngineHandle`].
//! The engine side may live in another thread (for example next to a wire
//! decoder) and push already decoded notifications.

use crate::debugger::command::Command;
use crate::transport::{Notification, Transport, TransportError};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// What the engine side observes from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Connect,
    Command {
        transaction_id: u32,
        command: Command,
    },
    Disconnect,
}

impl Request {
    /// DBGp command line for command requests.
    pub fn to_dbgp(&self) -> Option<String> {
        match self {
            Request::Command {
                transaction_id,
                command,
            } => command.encode(*transaction_id),
            _ => None,
        }
    }
}

pub struct ChannelTransport {
    connected: bool,
    next_transaction_id: u32,
    requests: Sender<Request>,
    notifications: Receiver<Notification>,
}

impl Transport for ChannelTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.requests
            .send(Request::Connect)
            .map_err(|_| TransportError::Connect("engine side is gone".to_string()))?;
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.connected = false;
        self.requests
            .send(Request::Disconnect)
            .map_err(|_| TransportError::Disconnect("engine side is gone".to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }

        let transaction_id = self.next_transaction_id;
        self.next_transaction_id = self.next_transaction_id.wrapping_add(1);

        self.requests
            .send(Request::Command {
                transaction_id,
                command: *command,
            })
            .map_err(|_| TransportError::Send {
                command: *command,
                reason: "engine side is gone".to_string(),
            })
    }

    fn poll(&mut self, timeout: Option<Duration>) -> Result<Option<Notification>, TransportError> {
        match timeout {
            None => match self.notifications.try_recv() {
                Ok(notification) => Ok(Some(notification)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => Err(TransportError::Closed),
            },
            Some(timeout) => match self.notifications.recv_timeout(timeout) {
                Ok(notification) => Ok(Some(notification)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
            },
        }
    }
}

/// Engine side of a [`ChannelTransport`].
pub struct EngineHandle {
    requests: Receiver<Request>,
    notifications: Sender<Notification>,
}

impl EngineHandle {
    /// Push a notification to the controller.
    /// Return `false` if the controller side is dropped.
    pub fn notify(&self, notification: Notification) -> bool {
        self.notifications.send(notification).is_ok()
    }

    /// Take all requests sent so far.
    pub fn drain(&self) -> Vec<Request> {
        self.requests.try_iter().collect()
    }
}

/// Create a connected transport pair.
///
/// [`ChannelTransport`] is given to the session controller, [`EngineHandle`]
/// stays with the code that talks to the engine.
pub fn pair() -> (ChannelTransport, EngineHandle) {
    let (req_tx, req_rx) = channel::<Request>();
    let (notify_tx, notify_rx) = channel::<Notification>();
    (
        ChannelTransport {
            connected: false,
            next_transaction_id: 1,
            requests: req_tx,
            notifications: notify_rx,
        },
        EngineHandle {
            requests: req_rx,
            notifications: notify_tx,
        },
    )
}
