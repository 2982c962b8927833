use std::io;
use std::time::Duration;

use cellprobe::test_support::{FakeMode, FakeTerminal};
use cellprobe::{
    query_cursor, CellExtent, CursorOptions, CursorPosition, ImageHeader, Pipeline, ProbeError,
    RawMode, ScaleFactors, TerminalGeometry,
};
use pretty_assertions::assert_eq;

#[test]
fn query_reads_position_and_restores_mode() {
    let mut tty = FakeTerminal::with_reply(b"\x1b[39;1R");
    let query = query_cursor(&mut tty, None).unwrap();

    assert_eq!(query.position, CursorPosition { row: 39, col: 1 });
    assert!(query.restore_warning.is_none());
    assert_eq!(tty.written, b"\x1b[6n");
    assert_eq!(tty.mode, FakeMode::default());
    assert_eq!(tty.applied.len(), 2);
}

#[test]
fn raw_mode_disables_canonical_input_and_echo() {
    let mut tty = FakeTerminal::with_reply(b"\x1b[1;1R");
    query_cursor(&mut tty, Some(Duration::from_millis(500))).unwrap();

    let raw = &tty.applied[0];
    assert!(!raw.canonical);
    assert!(!raw.echo);
    assert_eq!(raw.timeout, Some(Duration::from_millis(500)));
    assert_eq!(raw.other_bits, FakeMode::default().other_bits);
}

#[test]
fn reply_without_separator_is_malformed_and_mode_restored() {
    let mut tty = FakeTerminal::with_reply(b"\x1b[39R");
    let err = query_cursor(&mut tty, None).unwrap_err();

    assert!(matches!(err, ProbeError::MalformedReply(_)), "{err:?}");
    assert_eq!(tty.mode, FakeMode::default());
    assert_eq!(tty.applied.len(), 2);
}

#[test]
fn read_failure_restores_identical_mode() {
    let mut tty = FakeTerminal::with_reply(b"\x1b[3");
    tty.read_error = Some(io::ErrorKind::BrokenPipe);
    let before = tty.mode.clone();

    let err = query_cursor(&mut tty, None).unwrap_err();

    match err {
        ProbeError::TerminalProtocol(err) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tty.mode, before);
    assert_eq!(tty.applied.last(), Some(&before));
}

#[test]
fn ctrl_c_during_wait_restores_mode() {
    let mut tty = FakeTerminal::with_reply(b"\x03");
    let err = query_cursor(&mut tty, None).unwrap_err();

    match err {
        ProbeError::TerminalProtocol(err) => assert_eq!(err.kind(), io::ErrorKind::Interrupted),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tty.mode, FakeMode::default());
}

#[test]
fn long_type_ahead_before_reply() {
    let mut queued = vec![b'j'; 40];
    queued.extend_from_slice(b"\x1b[12;7R");
    let mut tty = FakeTerminal::with_reply(&queued);
    let query = query_cursor(&mut tty, None).unwrap();
    assert_eq!(query.position, CursorPosition { row: 12, col: 7 });
}

#[test]
fn eof_before_reply_is_protocol_error() {
    let mut tty = FakeTerminal::new();
    let err = query_cursor(&mut tty, None).unwrap_err();
    assert!(matches!(err, ProbeError::TerminalProtocol(_)), "{err:?}");
    assert_eq!(tty.mode, FakeMode::default());
}

#[test]
fn setup_failure_leaves_terminal_untouched() {
    let mut tty = FakeTerminal::with_reply(b"\x1b[1;1R");
    tty.fail_raw = true;
    let err = query_cursor(&mut tty, None).unwrap_err();

    assert!(matches!(err, ProbeError::TerminalSetup(_)), "{err:?}");
    assert!(tty.applied.is_empty());
    assert!(tty.written.is_empty());

    let mut tty = FakeTerminal::with_reply(b"\x1b[1;1R");
    tty.fail_get = true;
    assert!(matches!(
        query_cursor(&mut tty, None),
        Err(ProbeError::TerminalSetup(_))
    ));
    assert!(tty.applied.is_empty());
}

#[test]
fn restore_failure_is_only_a_warning() {
    let mut tty = FakeTerminal::with_reply(b"\x1b[5;9R");
    tty.fail_restore = true;
    let query = query_cursor(&mut tty, None).unwrap();

    assert_eq!(query.position, CursorPosition { row: 5, col: 9 });
    assert!(matches!(
        query.restore_warning,
        Some(ProbeError::TerminalRestore(_))
    ));
}

#[test]
fn guard_restores_exactly_once() {
    let mut tty = FakeTerminal::new();
    {
        let guard = RawMode::enter(&mut tty, None).unwrap();
        assert!(guard.is_raw());
        guard.restore().unwrap();
    }
    assert_eq!(tty.applied.len(), 2);

    {
        let _guard = RawMode::enter(&mut tty, None).unwrap();
    }
    assert_eq!(tty.applied.len(), 4);
    assert_eq!(tty.mode, FakeMode::default());
}

#[test]
fn pipeline_reports_cells_and_cursor() {
    let pipeline = Pipeline::default();
    let geometry = TerminalGeometry::new(24, 80, 800, 480);
    let mut tty = FakeTerminal::with_reply(b"\x1b[39;1R");

    let outcome = pipeline
        .run_with(&ImageHeader::new(300, 100), &geometry, &mut tty)
        .unwrap();

    assert_eq!(outcome.report.extent, CellExtent { cols: 30, rows: 5 });
    assert_eq!(
        outcome.report.cursor,
        Some(CursorPosition { row: 39, col: 1 })
    );
    assert_eq!(outcome.report.to_string(), "30 5 39 1");
}

#[test]
fn pipeline_without_cursor_leaves_terminal_alone() {
    let pipeline = Pipeline {
        scale: ScaleFactors::new(0.5, 2.0),
        cursor: None,
        ..Pipeline::default()
    };
    let geometry = TerminalGeometry::new(24, 80, 800, 480);
    let mut tty = FakeTerminal::new();

    let outcome = pipeline
        .run_with(&ImageHeader::new(300, 100), &geometry, &mut tty)
        .unwrap();

    assert_eq!(outcome.report.to_string(), "60 2");
    assert!(tty.applied.is_empty());
    assert!(tty.written.is_empty());
}

#[test]
fn pipeline_passes_timeout_to_raw_mode() {
    let pipeline = Pipeline {
        cursor: Some(CursorOptions {
            timeout: Some(Duration::from_secs(1)),
        }),
        ..Pipeline::default()
    };
    let mut tty = FakeTerminal::new();
    let err = pipeline
        .run_with(
            &ImageHeader::new(1, 1),
            &TerminalGeometry::new(1, 1, 1, 1),
            &mut tty,
        )
        .unwrap_err();

    match err {
        ProbeError::TerminalProtocol(err) => assert_eq!(err.kind(), io::ErrorKind::TimedOut),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tty.applied[0].timeout, Some(Duration::from_secs(1)));
}
