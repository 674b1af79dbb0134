use crate::common::{msg, prepare_debugger, sent_commands, start_session, TestInfo};
use dbgp_session::config::ControllerConfig;
use dbgp_session::debugger::{Command, Error, Event};
use dbgp_session::transport::{Notification, TransportError};

#[test]
fn test_every_step_requests_variables_once() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    start_session(&mut debugger, &engine);
    engine.drain();

    let steps = [
        Command::Run,
        Command::StepOver,
        Command::StepInto,
        Command::StepOut,
        Command::StepInto,
    ];
    for (i, step) in steps.iter().enumerate() {
        debugger.dispatch(*step).unwrap();
        let line = (i + 2).to_string();
        engine.notify(Notification::Stepped(msg([
            ("status", "break"),
            ("lineno", line.as_str()),
        ])));
        debugger.pump_all().unwrap();
        engine.notify(Notification::VariablesReceived(msg([])));
        debugger.pump_all().unwrap();
    }

    let commands = sent_commands(&engine.drain());
    let step_count = commands.iter().filter(|c| c.is_continuation()).count();
    let vars_count = commands
        .iter()
        .filter(|c| **c == Command::GetVariables)
        .count();
    assert_eq!(step_count, steps.len());
    assert_eq!(vars_count, steps.len());

    // each step command is followed by exactly one variables request
    for pair in commands.chunks(2) {
        assert!(pair[0].is_continuation());
        assert_eq!(pair[1], Command::GetVariables);
    }

    let events = info.events();
    assert_eq!(events.len(), 1 + steps.len() * 2);
    for pair in events[1..].chunks(2) {
        assert_eq!(pair, [Event::StepCompleted, Event::VariablesReady]);
    }
    assert_eq!(debugger.current_line(), 6);
}

#[test]
fn test_variables_request_precedes_variables_ready() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    start_session(&mut debugger, &engine);
    engine.drain();

    debugger.step_into().unwrap();
    engine.notify(Notification::Stepped(msg([("status", "break")])));
    debugger.pump().unwrap();

    // variables request is already sent when the step is reported
    assert_eq!(
        sent_commands(&engine.drain()),
        vec![Command::StepInto, Command::GetVariables]
    );
    assert_eq!(info.events().last(), Some(&Event::StepCompleted));
}

#[test]
fn test_commands_are_not_guarded_by_default() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    debugger.start().unwrap();

    // no status received yet, commands are forwarded anyway
    debugger.step_over().unwrap();
    debugger.step_out().unwrap();
    debugger.get_variables().unwrap();
    debugger.stop().unwrap();

    assert_eq!(
        sent_commands(&engine.drain()),
        vec![
            Command::StepOver,
            Command::StepOut,
            Command::GetVariables,
            Command::Stop
        ]
    );
}

#[test]
fn test_strict_commands() {
    let info = TestInfo::default();
    let config = ControllerConfig {
        strict_commands: true,
        ..Default::default()
    };
    let (mut debugger, engine) = prepare_debugger(info.clone(), config);
    start_session(&mut debugger, &engine);
    engine.drain();

    let err = debugger.step_over().unwrap_err();
    assert!(matches!(
        err,
        Error::IllegalCommand { command: Command::StepOver, ref status } if status == "starting"
    ));
    assert!(!err.is_fatal());
    assert!(sent_commands(&engine.drain()).is_empty());

    engine.notify(Notification::Status(msg([("status", "break")])));
    debugger.pump().unwrap();
    debugger.step_over().unwrap();

    // variables response carries no status, last known status is still `break`
    engine.notify(Notification::Stepped(msg([("status", "break")])));
    engine.notify(Notification::VariablesReceived(msg([])));
    debugger.pump_all().unwrap();
    assert!(!debugger.is_breaking());
    debugger.step_into().unwrap();

    engine.notify(Notification::Status(msg([("status", "stopping")])));
    debugger.pump().unwrap();
    assert!(matches!(
        debugger.run(),
        Err(Error::IllegalCommand {
            command: Command::Run,
            ..
        })
    ));
    // stop and variables requests are always allowed
    debugger.get_variables().unwrap();
    debugger.stop().unwrap();

    assert_eq!(
        sent_commands(&engine.drain()),
        vec![
            Command::StepOver,
            Command::GetVariables,
            Command::StepInto,
            Command::GetVariables,
            Command::Stop
        ]
    );
}

#[test]
fn test_commands_without_connection() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());

    let err = debugger.step_into().unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::NotConnected)
    ));
    assert!(matches!(
        debugger.stop(),
        Err(Error::Transport(TransportError::NotConnected))
    ));
    assert_eq!(debugger.outstanding_command(), None);
    assert!(engine.drain().is_empty());
}
