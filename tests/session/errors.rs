use crate::common::{msg, prepare_debugger, sent_commands, start_session, TestInfo};
use dbgp_session::config::ControllerConfig;
use dbgp_session::debugger::{
    ChannelHook, Command, DebuggerBuilder, Error, Event, ProtocolError, Status,
};
use dbgp_session::transport::channel;
use dbgp_session::transport::{Notification, TransportError};
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[test]
fn test_malformed_step_notification() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    start_session(&mut debugger, &engine);
    engine.drain();

    debugger.step_over().unwrap();
    engine.notify(Notification::Stepped(msg([
        ("status", "break"),
        ("filename", "file:///b.php"),
        ("lineno", "twelve"),
    ])));
    let err = debugger.pump().unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::InvalidLineNumber(ref raw)) if raw == "twelve"
    ));
    assert!(!err.is_fatal());

    // update is skipped as a whole
    assert_eq!(debugger.current_file(), "/var/www/index.php");
    assert_eq!(debugger.current_line(), 1);
    assert!(debugger.is_status("starting"));

    // but the step still completes and variables are refreshed
    assert_eq!(
        info.events(),
        vec![Event::DebuggingStarted, Event::StepCompleted]
    );
    assert_eq!(
        sent_commands(&engine.drain()),
        vec![Command::StepOver, Command::GetVariables]
    );
}

#[test]
fn test_unclassified_status() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    start_session(&mut debugger, &engine);

    engine.notify(Notification::Status(msg([("status", "detached")])));
    debugger.pump().unwrap();

    assert!(!debugger.is_breaking());
    assert!(!debugger.is_stopping());
    assert!(!debugger.is_stopped());
    assert!(debugger.is_status("detached"));
    assert_eq!(
        debugger.session().status(),
        Some(&Status::Unclassified("detached".to_string()))
    );
}

#[test]
fn test_command_timeout() {
    let info = TestInfo::default();
    let config = ControllerConfig {
        command_timeout_ms: Some(20),
        ..Default::default()
    };
    let (mut debugger, engine) = prepare_debugger(info.clone(), config);
    start_session(&mut debugger, &engine);

    let now = Instant::now();
    debugger.step_over().unwrap();
    let err = debugger.pump_all().unwrap_err();

    assert!(now.elapsed() >= Duration::from_millis(20));
    assert!(matches!(
        err,
        Error::Transport(TransportError::Timeout {
            command: Command::StepOver,
            ..
        })
    ));
    assert!(!err.is_fatal());
    assert_eq!(debugger.outstanding_command(), None);

    // nothing is outstanding anymore, pump returns immediately
    assert!(!debugger.pump().unwrap());
}

#[test]
fn test_answer_before_timeout() {
    let info = TestInfo::default();
    let config = ControllerConfig {
        command_timeout_ms: Some(5_000),
        ..Default::default()
    };
    let (mut debugger, engine) = prepare_debugger(info.clone(), config);
    start_session(&mut debugger, &engine);

    debugger.stop().unwrap();
    engine.notify(Notification::Status(msg([("status", "stopping")])));

    assert!(debugger.pump().unwrap());
    assert!(debugger.is_stopping());
    assert_eq!(debugger.outstanding_command(), None);
}

#[test]
fn test_no_timeout_by_default() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    start_session(&mut debugger, &engine);

    debugger.run().unwrap();
    assert!(!debugger.pump().unwrap());
    assert_eq!(debugger.outstanding_command(), Some(Command::Run));
}

#[test]
fn test_engine_gone() {
    let info = TestInfo::default();
    let (mut debugger, engine) = prepare_debugger(info.clone(), ControllerConfig::default());
    start_session(&mut debugger, &engine);
    drop(engine);

    let err = debugger.pump().unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Closed)));
    assert!(err.is_fatal());

    let err = debugger.step_over().unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Send {
            command: Command::StepOver,
            ..
        })
    ));
}

#[test]
fn test_channel_hook() {
    let (events_tx, events_rx) = mpsc::channel();
    let (transport, engine) = channel::pair();
    let mut debugger = DebuggerBuilder::new()
        .with_hooks(ChannelHook::new(events_tx))
        .build(transport);

    debugger.start().unwrap();
    engine.notify(Notification::Connected(msg([("status", "starting")])));
    engine.notify(Notification::Stepped(msg([("status", "break")])));
    engine.notify(Notification::VariablesReceived(msg([])));
    assert_eq!(debugger.pump_all().unwrap(), 3);

    let events: Vec<_> = events_rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            Event::DebuggingStarted,
            Event::StepCompleted,
            Event::VariablesReady
        ]
    );

    // presentation is gone: hook error is reported, variables are requested anyway
    drop(events_rx);
    engine.drain();
    engine.notify(Notification::Stepped(msg([("status", "break")])));
    let err = debugger.pump().unwrap_err();
    assert!(matches!(err, Error::Hook(_)));
    assert_eq!(sent_commands(&engine.drain()), vec![Command::GetVariables]);
}
