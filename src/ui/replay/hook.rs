use crate::debugger::{EventHook, Session};
use crate::ui::print::style::{FilePathView, KeywordView, VariableNameView};
use crate::ui::print::Printer;

/// Print session lifecycle into a terminal.
pub struct ConsoleHook {
    printer: Printer,
    show_variables: bool,
}

impl ConsoleHook {
    pub fn new(printer: Printer, show_variables: bool) -> Self {
        Self {
            printer,
            show_variables,
        }
    }

    fn print_position(&self, msg: &str, session: &Session) {
        if session.current_file().is_empty() {
            self.printer.println(format!("{msg} at unknown place"));
        } else {
            self.printer.println(format!(
                "{msg} at {}:{}",
                FilePathView::from(session.current_file()),
                session.current_line()
            ));
        }
    }
}

impl EventHook for ConsoleHook {
    fn on_debugging_started(&self, session: &Session) -> anyhow::Result<()> {
        self.print_position(
            &format!("{} debugging started", KeywordView::from(">>")),
            session,
        );
        Ok(())
    }

    fn on_step_completed(&self, session: &Session) -> anyhow::Result<()> {
        self.print_position(&format!("{} stop", KeywordView::from(">>")), session);
        Ok(())
    }

    fn on_variables_ready(&self, session: &Session) -> anyhow::Result<()> {
        if !self.show_variables {
            return Ok(());
        }

        let variables = session
            .last_message()
            .map(|msg| msg.variables())
            .unwrap_or_default();
        if variables.is_empty() {
            self.printer.println("   no variables in scope");
        }
        for var in variables {
            let kind = var
                .kind
                .as_deref()
                .map(|k| format!(" ({k})"))
                .unwrap_or_default();
            self.printer.println(format!(
                "   {}{kind} = {}",
                VariableNameView::from(&var.name),
                var.value.as_deref().unwrap_or("uninitialized")
            ));
        }
        Ok(())
    }
}
