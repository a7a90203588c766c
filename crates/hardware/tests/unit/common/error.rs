//! # Error Tests
//!
//! Display messages and `SimError` conversions.

use mesisim_core::common::error::{ConfigError, ScheduleError, SimError, TraceError};

#[test]
fn trace_errors_name_the_line() {
    let err = TraceError::Malformed {
        line: 3,
        reason: "record must start with '('",
    };
    assert_eq!(err.to_string(), "line 3: record must start with '('");

    let err = TraceError::InvalidNumber {
        line: 7,
        field: "read address",
        value: "12x".to_owned(),
    };
    assert_eq!(err.to_string(), "line 7: invalid read address '12x'");
}

#[test]
fn schedule_error_messages() {
    let err = ScheduleError::UnknownThread { core: 2, thread: 9 };
    assert_eq!(err.to_string(), "core 2 is assigned thread 9, which has no trace");

    let err = ScheduleError::DuplicateAssignment {
        thread: 4,
        first: 0,
        second: 3,
    };
    assert_eq!(
        err.to_string(),
        "thread 4 is assigned to both core 0 and core 3"
    );
}

#[test]
fn sim_error_is_transparent() {
    let err: SimError = ConfigError::Geometry("ways must be at least 1").into();
    assert!(matches!(err, SimError::Config(_)));
    assert_eq!(err.to_string(), "invalid cache geometry: ways must be at least 1");

    let err: SimError = TraceError::MissingEof.into();
    assert!(matches!(err, SimError::Trace(TraceError::MissingEof)));

    let err: SimError = ScheduleError::UnknownThread { core: 0, thread: 1 }.into();
    assert!(matches!(
        err,
        SimError::Schedule(ScheduleError::UnknownThread { core: 0, thread: 1 })
    ));
}
