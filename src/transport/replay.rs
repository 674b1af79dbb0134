//! Transport replaying a recorded engine conversation.
//!
//! Script is a TOML document with already decoded notifications:
//!
//! ```toml
//! [[notification]]
//! kind = "connected"
//! status = "starting"
//! filename = "file:///var/www/index.php"
//! lineno = 1
//!
//! [[notification]]
//! kind = "stepped"
//! status = "break"
//! lineno = 3
//!
//! [[notification]]
//! kind = "variables"
//! [[notification.variables]]
//! name = "$a"
//! type = "int"
//! value = "1"
//! ```
//!
//! A leading `connected` notification is released on connect, then every sent
//! command releases the next notification of the script.

use crate::debugger::command::Command;
use crate::debugger::message::{Message, Variable};
use crate::transport::{Notification, Transport, TransportError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("read script: {0}")]
    IO(#[from] std::io::Error),
    #[error("parse script: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Deserialize)]
struct Script {
    #[serde(default, rename = "notification")]
    notifications: Vec<ScriptEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Kind {
    Connected,
    Stepped,
    #[serde(alias = "variables_received")]
    Variables,
    Status,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl FieldValue {
    fn into_string(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ScriptEntry {
    kind: Kind,
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(flatten)]
    fields: IndexMap<String, FieldValue>,
}

impl From<ScriptEntry> for Notification {
    fn from(entry: ScriptEntry) -> Self {
        let message = entry
            .fields
            .into_iter()
            .map(|(k, v)| (k, v.into_string()))
            .collect::<Message>()
            .with_variables(entry.variables);

        match entry.kind {
            Kind::Connected => Notification::Connected(message),
            Kind::Stepped => Notification::Stepped(message),
            Kind::Variables => Notification::VariablesReceived(message),
            Kind::Status => Notification::Status(message),
        }
    }
}

pub struct ReplayTransport {
    pending: VecDeque<Notification>,
    released: VecDeque<Notification>,
    connected: bool,
    next_transaction_id: u32,
}

impl ReplayTransport {
    pub fn new(notifications: impl IntoIterator<Item = Notification>) -> Self {
        Self {
            pending: notifications.into_iter().collect(),
            released: VecDeque::new(),
            connected: false,
            next_transaction_id: 1,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        read_to_string(path)?.parse()
    }

    /// Count of notifications not yet released.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn release_next(&mut self) {
        if let Some(notification) = self.pending.pop_front() {
            self.released.push_back(notification);
        }
    }
}

impl FromStr for ReplayTransport {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let script: Script = toml::from_str(s)?;
        Ok(Self::new(
            script.notifications.into_iter().map(Notification::from),
        ))
    }
}

impl Transport for ReplayTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        if matches!(self.pending.front(), Some(Notification::Connected(_))) {
            self.release_next();
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.connected = false;
        self.released.clear();
        Ok(())
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
        if let Some(line) = command.encode(transaction_id) {
            log::debug!(target: "transport", "replay <- {line}");
        }

        self.release_next();
        Ok(())
    }

    fn poll(&mut self, timeout: Option<Duration>) -> Result<Option<Notification>, TransportError> {
        let notification = self.released.pop_front();
        if notification.is_none() {
            if let Some(timeout) = timeout {
                // nothing will ever arrive, behave like a silent engine
                std::thread::sleep(timeout);
            }
        }
        Ok(notification)
    }
}
