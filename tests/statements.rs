//! Prepared statement lifecycle: Parse / Bind / Describe / Execute / Sync.

use std::cell::RefCell;
use std::rc::Rc;

use sans_postgres::{Error, Event, EventKind, Session, SessionConfig, SessionState};

fn session() -> Session {
    let mut session = Session::new(SessionConfig {
        user: "alice".into(),
        database: Some("app".into()),
        options: None,
    });
    session.initial_request().unwrap();
    session
}

fn frame(type_byte: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![type_byte];
    out.extend_from_slice(&(payload.len() as i32 + 4).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn capture(session: &mut Session, kind: EventKind) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    session.attach_event(kind, move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// RowDescription payload declaring a single int4 column named "n".
fn one_int_column() -> Vec<u8> {
    let mut payload = vec![0, 1];
    payload.extend_from_slice(b"n\0");
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(&0i16.to_be_bytes());
    payload.extend_from_slice(&23u32.to_be_bytes());
    payload.extend_from_slice(&4i16.to_be_bytes());
    payload.extend_from_slice(&(-1i32).to_be_bytes());
    payload.extend_from_slice(&0u16.to_be_bytes());
    payload
}

#[test]
fn prepare_emits_parse_immediately() {
    let mut session = session();
    let sends = capture(&mut session, EventKind::SendRequest);

    let statement = session.prepare("select $1").unwrap();
    assert_eq!(statement.name(), "");
    assert_eq!(statement.sql(), "select $1");
    assert_eq!(session.state(), SessionState::Busy);

    let sends = sends.borrow();
    match &sends[0] {
        Event::SendRequest { data } => {
            assert_eq!(data[0], b'P');
            // Unnamed statement, SQL, zero parameter types.
            assert_eq!(&data[5..], b"\0select $1\0\x00\x00");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn bind_execute_finish_frames() {
    let mut session = session();
    let statement = session.prepare_named("s1", "select $1::int4").unwrap();

    let bind = statement
        .bind(&mut session, &[Some(b"42"), None])
        .unwrap();
    assert_eq!(bind[0], b'B');
    // Unnamed portal, statement name "s1".
    assert_eq!(&bind[5..9], b"\0s1\0");
    // Zero param format codes, two parameters.
    assert_eq!(&bind[9..13], &[0, 0, 0, 2]);
    // Length-prefixed "42", then the NULL marker.
    assert_eq!(&bind[13..19], &[0, 0, 0, 2, b'4', b'2']);
    assert_eq!(&bind[19..23], &[0xff, 0xff, 0xff, 0xff]);
    // Zero result format codes close the frame.
    assert_eq!(&bind[23..], &[0, 0]);

    let execute = statement.execute(&mut session).unwrap();
    assert_eq!(execute[0], b'E');
    // Unnamed portal, unlimited rows.
    assert_eq!(&execute[5..], b"\0\x00\x00\x00\x00");

    let limited = statement.execute_limit(&mut session, 50).unwrap();
    assert_eq!(&limited[5..], b"\0\x00\x00\x00\x32");

    let sync = statement.finish(&mut session).unwrap();
    assert_eq!(sync, b"S\x00\x00\x00\x04");
}

#[test]
fn describe_remembers_row_description_per_statement() {
    let mut session = session();
    let statement = session.prepare_named("s1", "select n from t").unwrap();

    let describe = statement.describe(&mut session).unwrap();
    assert_eq!(describe[0], b'D');
    assert_eq!(&describe[5..], b"Ss1\0");

    session.handle_message(&frame(b'1', b"")).unwrap();
    session.handle_message(&frame(b'T', &one_int_column())).unwrap();

    let remembered = statement.row_description(&session).unwrap();
    assert_eq!(remembered.len(), 1);
    assert_eq!(remembered[0].name, "n");

    // A later resultset replaces the session's current description...
    let mut other = vec![0, 1];
    other.extend_from_slice(b"x\0");
    other.extend_from_slice(&0u32.to_be_bytes());
    other.extend_from_slice(&0i16.to_be_bytes());
    other.extend_from_slice(&25u32.to_be_bytes());
    other.extend_from_slice(&(-1i16).to_be_bytes());
    other.extend_from_slice(&(-1i32).to_be_bytes());
    other.extend_from_slice(&0u16.to_be_bytes());
    session.handle_message(&frame(b'T', &other)).unwrap();
    assert_eq!(session.row_description().unwrap()[0].name, "x");

    // ...but execute reinstalls the statement's remembered shape, so
    // following DataRow frames decode against the right columns.
    statement.bind(&mut session, &[]).unwrap();
    statement.execute(&mut session).unwrap();
    assert_eq!(session.row_description().unwrap()[0].name, "n");

    let rows = capture(&mut session, EventKind::DataRow);
    let mut row = vec![0, 1];
    row.extend_from_slice(&1i32.to_be_bytes());
    row.push(b'7');
    session.handle_message(&frame(b'D', &row)).unwrap();

    match &rows.borrow()[0] {
        Event::DataRow { cells } => assert_eq!(cells[0].description.name, "n"),
        other => panic!("unexpected event {:?}", other),
    };
}

#[test]
fn no_data_clears_pending_describe() {
    let mut session = session();
    let statement = session.prepare_named("s1", "insert into t values (1)").unwrap();

    statement.describe(&mut session).unwrap();
    session.handle_message(&frame(b'1', b"")).unwrap();
    session.handle_message(&frame(b'n', b"")).unwrap();

    assert!(statement.row_description(&session).is_none());
}

#[test]
fn close_drops_remembered_description() {
    let mut session = session();
    let statement = session.prepare_named("s1", "select n from t").unwrap();
    statement.describe(&mut session).unwrap();
    session.handle_message(&frame(b'T', &one_int_column())).unwrap();
    assert!(statement.row_description(&session).is_some());

    let close = statement.close(&mut session).unwrap();
    assert_eq!(close[0], b'C');
    assert_eq!(&close[5..], b"Ss1\0");
    assert!(statement.row_description(&session).is_none());

    session.handle_message(&frame(b'3', b"")).unwrap();
}

#[test]
fn extended_completion_events() {
    let mut session = session();
    let order = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        EventKind::ParseComplete,
        EventKind::BindComplete,
        EventKind::PortalSuspended,
        EventKind::CloseComplete,
        EventKind::NoData,
        EventKind::ParameterDescription,
    ] {
        let sink = order.clone();
        session.attach_event(kind, move |event| {
            sink.borrow_mut().push(event.name());
        });
    }

    session.handle_message(&frame(b'1', b"")).unwrap();
    session.handle_message(&frame(b'2', b"")).unwrap();
    session.handle_message(&frame(b's', b"")).unwrap();
    session.handle_message(&frame(b'3', b"")).unwrap();
    session.handle_message(&frame(b'n', b"")).unwrap();
    session
        .handle_message(&frame(b't', &[0, 1, 0, 0, 0, 23]))
        .unwrap();

    assert_eq!(
        *order.borrow(),
        vec![
            "parse_complete",
            "bind_complete",
            "portal_suspended",
            "close_complete",
            "no_data",
            "parameter_description"
        ]
    );
}

#[test]
fn failed_transaction_rejects_statement_writes() {
    let mut session = session();
    let statement = session.prepare_named("s1", "select 1").unwrap();

    session.handle_message(&frame(b'Z', b"E")).unwrap();

    assert!(matches!(
        statement.bind(&mut session, &[]),
        Err(Error::InvalidUsage(_))
    ));
    assert!(matches!(
        statement.execute(&mut session),
        Err(Error::InvalidUsage(_))
    ));
    assert!(matches!(session.prepare("select 2"), Err(Error::InvalidUsage(_))));

    // Sync is still allowed and the server clears the failed state.
    statement.finish(&mut session).unwrap();
    session.handle_message(&frame(b'Z', b"I")).unwrap();
    assert!(statement.bind(&mut session, &[]).is_ok());
}
