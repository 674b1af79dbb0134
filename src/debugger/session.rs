use crate::debugger::error::ProtocolError;
use crate::debugger::message::Message;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum_macros::EnumString;

const FILE_SCHEME: &str = "file://";

/// Engine status as reported in the `status` field of a response.
///
/// Spelling is exact and case-sensitive, anything else is [`Status::Unclassified`].
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum Status {
    #[strum(serialize = "starting")]
    Starting,
    /// Execution paused, the engine accepts inspection and step commands.
    #[strum(serialize = "break")]
    Break,
    #[strum(serialize = "running")]
    Running,
    #[strum(serialize = "stopping")]
    Stopping,
    #[strum(serialize = "stopped")]
    Stopped,
    #[strum(default)]
    Unclassified(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        Status::from_str(raw).unwrap_or_else(|_| Status::Unclassified(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Starting => "starting",
            Status::Break => "break",
            Status::Running => "running",
            Status::Stopping => "stopping",
            Status::Stopped => "stopped",
            Status::Unclassified(raw) => raw,
        }
    }

    /// Transition table of the engine status machine.
    /// Unclassified statuses are accepted in both directions.
    pub fn can_transition_to(&self, next: &Status) -> bool {
        use Status::*;

        match (self, next) {
            (Unclassified(_), _) | (_, Unclassified(_)) => true,
            (Starting, _) => true,
            (Break | Running, Break | Running | Stopping | Stopped) => true,
            (Stopping, Stopping | Stopped) => true,
            (Stopped, Stopped) => true,
            _ => false,
        }
    }

    /// True if the engine will not accept continuation commands anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Stopping | Status::Stopped)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the single debugging session driven by a controller.
///
/// Current position is derived from the received messages: a message without
/// `filename` or `lineno` keeps the previously known value.
#[derive(Debug, Default)]
pub struct Session {
    last_message: Option<Message>,
    /// Last known status, survives messages without `status` field.
    status: Option<Status>,
    current_file: String,
    current_line: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source file of the current position with a leading `file://` scheme stripped.
    /// Only the leading scheme is removed, occurrences inside the path are kept.
    /// Empty string until the engine reports a file.
    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    pub fn current_line(&self) -> u64 {
        self.current_line
    }

    /// True if the last received message has a `status` equal to `candidate`.
    pub fn is_status(&self, candidate: &str) -> bool {
        self.last_message
            .as_ref()
            .and_then(Message::status)
            .is_some_and(|status| status == candidate)
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.last_message.as_ref()
    }

    /// Update session from an engine message.
    ///
    /// Either the whole message is applied or, if it is malformed, nothing.
    pub fn apply(&mut self, message: &Message) -> Result<(), ProtocolError> {
        let line = message.lineno().map(parse_line).transpose()?;
        let file = message.filename().map(strip_scheme);
        let status = message.status().map(Status::parse);

        if let (Some(prev), Some(next)) = (&self.status, &status) {
            if !prev.can_transition_to(next) {
                crate::session_warn!(target: "debugger", "unexpected engine status transition: {prev} -> {next}");
            }
        }

        if let Some(line) = line {
            self.current_line = line;
        }
        if let Some(file) = file {
            self.current_file = file.to_string();
        }
        if status.is_some() {
            self.status = status;
        }
        self.last_message = Some(message.clone());

        Ok(())
    }

    /// Return session into initial state.
    pub fn reset(&mut self) {
        self.last_message = None;
        self.status = None;
        self.current_file.clear();
        self.current_line = 0;
    }
}

fn parse_line(raw: &str) -> Result<u64, ProtocolError> {
    raw.trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidLineNumber(raw.to_string()))
}

fn strip_scheme(raw: &str) -> &str {
    raw.strip_prefix(FILE_SCHEME).unwrap_or(raw)
}
