pub mod command;
pub mod error;
pub mod message;
pub mod session;

pub use command::Command;
pub use error::{Error, ProtocolError};
pub use message::{Message, Variable};
pub use session::{Session, Status};

use crate::config::ControllerConfig;
use crate::transport::{Notification, Transport, TransportError};
use crate::{session_debug, session_info, weak_error};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// Session lifecycle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    DebuggingStarted,
    /// Engine paused after a step, variables are not received yet.
    StepCompleted,
    VariablesReady,
}

/// Presentation side observer of session lifecycle.
///
/// Hooks are called after the session is updated from the corresponding
/// engine notification.
pub trait EventHook {
    fn on_debugging_started(&self, session: &Session) -> anyhow::Result<()>;

    /// Called when engine paused after a step or run command.
    /// Variables refresh is already requested at this point, presentation
    /// should wait for [`EventHook::on_variables_ready`] before rendering.
    fn on_step_completed(&self, session: &Session) -> anyhow::Result<()>;

    fn on_variables_ready(&self, session: &Session) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct NopHook;

impl EventHook for NopHook {
    fn on_debugging_started(&self, _: &Session) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_step_completed(&self, _: &Session) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_variables_ready(&self, _: &Session) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Forward lifecycle events into a channel, for presentations running in another thread.
pub struct ChannelHook {
    events: Sender<Event>,
}

impl ChannelHook {
    pub fn new(events: Sender<Event>) -> Self {
        Self { events }
    }

    fn emit(&self, event: Event) -> anyhow::Result<()> {
        Ok(self.events.send(event)?)
    }
}

impl EventHook for ChannelHook {
    fn on_debugging_started(&self, _: &Session) -> anyhow::Result<()> {
        self.emit(Event::DebuggingStarted)
    }

    fn on_step_completed(&self, _: &Session) -> anyhow::Result<()> {
        self.emit(Event::StepCompleted)
    }

    fn on_variables_ready(&self, _: &Session) -> anyhow::Result<()> {
        self.emit(Event::VariablesReady)
    }
}

pub struct DebuggerBuilder<H: EventHook = NopHook> {
    hooks: H,
    config: ControllerConfig,
}

impl DebuggerBuilder<NopHook> {
    pub fn new() -> Self {
        Self {
            hooks: NopHook,
            config: ControllerConfig::default(),
        }
    }
}

impl Default for DebuggerBuilder<NopHook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: EventHook> DebuggerBuilder<H> {
    pub fn with_hooks<H2: EventHook>(self, hooks: H2) -> DebuggerBuilder<H2> {
        DebuggerBuilder {
            hooks,
            config: self.config,
        }
    }

    pub fn with_config(self, config: ControllerConfig) -> Self {
        Self { config, ..self }
    }

    pub fn build<T: Transport>(self, transport: T) -> Debugger<T, H> {
        Debugger {
            transport,
            hooks: self.hooks,
            session: Session::new(),
            config: self.config,
            outstanding: None,
        }
    }
}

/// Command waiting for an engine answer.
struct Outstanding {
    command: Command,
    since: Instant,
}

/// Controller of a single debugging session.
///
/// Commands are fire-and-forget: they are sent through the transport and the
/// engine answer is processed later, one notification at a time, by
/// [`Debugger::pump`] or [`Debugger::handle`].
pub struct Debugger<T: Transport, H: EventHook = NopHook> {
    transport: T,
    hooks: H,
    session: Session,
    config: ControllerConfig,
    outstanding: Option<Outstanding>,
}

impl<T: Transport, H: EventHook> Debugger<T, H> {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Command sent to the engine and not answered yet.
    pub fn outstanding_command(&self) -> Option<Command> {
        self.outstanding.as_ref().map(|o| o.command)
    }

    pub fn current_file(&self) -> &str {
        self.session.current_file()
    }

    pub fn current_line(&self) -> u64 {
        self.session.current_line()
    }

    pub fn is_status(&self, status: &str) -> bool {
        self.session.is_status(status)
    }

    pub fn is_breaking(&self) -> bool {
        self.is_status("break")
    }

    pub fn is_stopping(&self) -> bool {
        self.is_status("stopping")
    }

    pub fn is_stopped(&self) -> bool {
        self.is_status("stopped")
    }

    /// Start a debugging session: open a connection if there is no connection yet.
    /// Session is started when engine reports [`Notification::Connected`].
    pub fn start(&mut self) -> Result<(), Error> {
        if self.transport.is_connected() {
            session_debug!(target: "debugger", "already connected, start ignored");
            return Ok(());
        }

        self.transport.connect()?;
        session_info!(target: "debugger", "waiting for engine connection");
        Ok(())
    }

    /// Ask engine to stop debugging. Session state is untouched, see [`Debugger::cleanup`].
    pub fn stop(&mut self) -> Result<(), Error> {
        self.send(Command::Stop)
    }

    /// Close connection (if any) and reset session state.
    /// Disconnect errors are logged and ignored.
    pub fn cleanup(&mut self) {
        if self.transport.is_connected() {
            weak_error!(self.transport.disconnect(), "disconnect:");
        }
        self.outstanding = None;
        self.session.reset();
    }

    pub fn run(&mut self) -> Result<(), Error> {
        self.send_continuation(Command::Run)
    }

    pub fn step_over(&mut self) -> Result<(), Error> {
        self.send_continuation(Command::StepOver)
    }

    pub fn step_into(&mut self) -> Result<(), Error> {
        self.send_continuation(Command::StepInto)
    }

    pub fn step_out(&mut self) -> Result<(), Error> {
        self.send_continuation(Command::StepOut)
    }

    pub fn get_variables(&mut self) -> Result<(), Error> {
        self.send(Command::GetVariables)
    }

    /// Issue a command by its value.
    pub fn dispatch(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Run => self.run(),
            Command::StepOver => self.step_over(),
            Command::StepInto => self.step_into(),
            Command::StepOut => self.step_out(),
            Command::GetVariables => self.get_variables(),
        }
    }

    fn send_continuation(&mut self, command: Command) -> Result<(), Error> {
        if self.config.strict_commands && self.session.status() != Some(&Status::Break) {
            return Err(Error::IllegalCommand {
                command,
                status: self
                    .session
                    .status()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "none".to_string()),
            });
        }
        self.send(command)
    }

    fn send(&mut self, command: Command) -> Result<(), Error> {
        session_debug!(target: "debugger", "send `{command}`");
        self.transport.send(&command)?;
        self.outstanding = Some(Outstanding {
            command,
            since: Instant::now(),
        });
        Ok(())
    }

    /// Process a single engine notification.
    ///
    /// If the notification message is malformed, session update is skipped but
    /// the notification is still routed, then [`Error::Protocol`] is returned.
    pub fn handle(&mut self, notification: Notification) -> Result<(), Error> {
        session_debug!(target: "debugger", "received `{}` notification", notification.kind());

        self.outstanding = None;
        let applied = self.session.apply(notification.message());
        if let Err(ref e) = applied {
            crate::session_warn!(target: "debugger", "session update skipped: {e}");
        }

        match notification {
            Notification::Connected(_) => {
                self.hooks
                    .on_debugging_started(&self.session)
                    .map_err(Error::Hook)?;
            }
            Notification::Stepped(_) => {
                let hook_result = self.hooks.on_step_completed(&self.session);
                self.get_variables()?;
                hook_result.map_err(Error::Hook)?;
            }
            Notification::VariablesReceived(_) => {
                self.hooks
                    .on_variables_ready(&self.session)
                    .map_err(Error::Hook)?;
            }
            Notification::Status(_) => {}
        }

        Ok(applied?)
    }

    /// Process next notification from transport if there is one.
    /// Return `true` if a notification was processed.
    ///
    /// With configured command timeout waits for the answer on outstanding
    /// command and fails with [`TransportError::Timeout`] when time is out.
    pub fn pump(&mut self) -> Result<bool, Error> {
        let wait = self.remaining_time();

        if let Some(notification) = self.transport.poll(wait)? {
            self.handle(notification)?;
            return Ok(true);
        }

        if let Some(timeout) = self.config.command_timeout() {
            if let Some(outstanding) = self.take_expired(timeout) {
                return Err(TransportError::Timeout {
                    command: outstanding.command,
                    elapsed: outstanding.since.elapsed(),
                }
                .into());
            }
        }

        Ok(false)
    }

    /// Process notifications until the transport has nothing to deliver.
    /// Return count of processed notifications.
    pub fn pump_all(&mut self) -> Result<usize, Error> {
        let mut count = 0;
        while self.pump()? {
            count += 1;
        }
        Ok(count)
    }

    fn remaining_time(&self) -> Option<Duration> {
        let timeout = self.config.command_timeout()?;
        let outstanding = self.outstanding.as_ref()?;
        Some(timeout.saturating_sub(outstanding.since.elapsed()))
    }

    fn take_expired(&mut self, timeout: Duration) -> Option<Outstanding> {
        let expired = self
            .outstanding
            .as_ref()
            .is_some_and(|o| o.since.elapsed() >= timeout);
        if expired {
            self.outstanding.take()
        } else {
            None
        }
    }
}
