//! Console frontend driving a session over a replayed engine conversation.

pub mod hook;

use crate::config::Config;
use crate::debugger::{Command, Debugger, DebuggerBuilder};
use crate::transport::Transport;
use crate::ui::print::style::{ErrorView, FilePathView, StatusView};
use crate::ui::print::Printer;
use clap::ValueEnum;
use hook::ConsoleHook;

/// User command of the replay frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplayCommand {
    Run,
    Over,
    Into,
    Out,
    Vars,
    Stop,
}

impl From<ReplayCommand> for Command {
    fn from(cmd: ReplayCommand) -> Self {
        match cmd {
            ReplayCommand::Run => Command::Run,
            ReplayCommand::Over => Command::StepOver,
            ReplayCommand::Into => Command::StepInto,
            ReplayCommand::Out => Command::StepOut,
            ReplayCommand::Vars => Command::GetVariables,
            ReplayCommand::Stop => Command::Stop,
        }
    }
}

pub struct AppBuilder {
    config: Config,
    printer: Printer,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            printer: Printer::stdout(),
        }
    }

    pub fn with_printer(self, printer: Printer) -> Self {
        Self { printer, ..self }
    }

    pub fn build<T: Transport>(self, transport: T, commands: Vec<ReplayCommand>) -> App<T> {
        let hook = ConsoleHook::new(self.printer.clone(), self.config.ui.show_variables);
        let debugger = DebuggerBuilder::new()
            .with_config(self.config.controller)
            .with_hooks(hook)
            .build(transport);

        App {
            debugger,
            commands,
            printer: self.printer,
        }
    }
}

pub struct App<T: Transport> {
    debugger: Debugger<T, ConsoleHook>,
    commands: Vec<ReplayCommand>,
    printer: Printer,
}

impl<T: Transport> App<T> {
    /// Start session, issue all commands one by one, then cleanup.
    /// Non-fatal errors are printed and the replay continues.
    pub fn run(mut self) -> anyhow::Result<()> {
        self.debugger.start()?;
        self.drain()?;

        for cmd in std::mem::take(&mut self.commands) {
            if let Err(e) = self.debugger.dispatch(cmd.into()) {
                if e.is_fatal() {
                    return Err(e.into());
                }
                self.printer.println(ErrorView::from(e));
                continue;
            }
            self.drain()?;
        }

        self.print_summary();
        self.debugger.cleanup();
        Ok(())
    }

    fn drain(&mut self) -> anyhow::Result<()> {
        loop {
            match self.debugger.pump() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => self.printer.println(ErrorView::from(e)),
            }
        }
    }

    fn print_summary(&self) {
        let session = self.debugger.session();
        let status = session.status().map(ToString::to_string);
        let file = Some(session.current_file()).filter(|f| !f.is_empty());
        self.printer.println(format!(
            "session status: {}, position: {}:{}",
            StatusView::<String>::from(status),
            FilePathView::<&str>::from(file),
            session.current_line()
        ));
        if session.status().is_some_and(|s| s.is_terminal()) {
            self.printer.println("engine finished the session");
        }
    }
}
