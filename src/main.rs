use clap::Parser;
use dbgp_session::config::Config;
use dbgp_session::transport::replay::ReplayTransport;
use dbgp_session::ui::print::style;
use dbgp_session::ui::replay::{AppBuilder, ReplayCommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script with decoded engine notifications (TOML)
    script: PathBuf,

    /// Path to config file (default: ~/.config/dbgp-session/config.toml)
    #[clap(long, env = "DBGP_SESSION_CONFIG")]
    config: Option<PathBuf>,

    /// Reject run/step commands while engine is not in `break` status
    #[clap(long)]
    strict: bool,

    /// Fail a command if the engine does not answer in time
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// Disable terminal colors
    #[clap(long)]
    no_color: bool,

    /// Mute library logs
    #[clap(short, long)]
    quiet: bool,

    /// Commands issued after session start, in order
    #[clap(short, long = "command", value_enum)]
    commands: Vec<ReplayCommand>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::from_file(args.config.as_deref())?;
    if args.strict {
        config.controller.strict_commands = true;
    }
    if args.timeout_ms.is_some() {
        config.controller.command_timeout_ms = args.timeout_ms;
    }
    if args.no_color {
        config.ui.color = false;
    }
    style::set_colored(config.ui.color);
    if args.quiet {
        dbgp_session::log::disable();
    }

    let transport = ReplayTransport::from_file(&args.script)?;
    let app = AppBuilder::new(config).build(transport, args.commands);
    app.run()
}
