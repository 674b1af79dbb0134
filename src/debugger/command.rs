use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Controller initiated session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
pub enum Command {
    #[strum(serialize = "start")]
    Start,
    #[strum(serialize = "stop")]
    Stop,
    #[strum(serialize = "run")]
    Run,
    #[strum(serialize = "step_over")]
    StepOver,
    #[strum(serialize = "step_into")]
    StepInto,
    #[strum(serialize = "step_out")]
    StepOut,
    #[strum(serialize = "context_get")]
    GetVariables,
}

impl Command {
    /// DBGp action implementing this command.
    /// [`Command::Start`] is handled at connection level and has no action.
    pub fn protocol_action(self) -> Option<&'static str> {
        match self {
            Command::Start => None,
            cmd => Some(cmd.into()),
        }
    }

    /// True for commands that resume the engine and end with a `stepped` notification.
    pub fn is_continuation(self) -> bool {
        matches!(
            self,
            Command::Run | Command::StepOver | Command::StepInto | Command::StepOut
        )
    }

    /// Render a DBGp command line (without the trailing NUL).
    pub fn encode(self, transaction_id: u32) -> Option<String> {
        let action = self.protocol_action()?;
        Some(format!("{action} -i {transaction_id}"))
    }
}
