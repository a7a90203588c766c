//! # Trace Parser Tests
//!
//! Record syntax, whitespace handling, the `#eof` terminator and every
//! load error.

use mesisim_core::common::error::TraceError;
use mesisim_core::sim::trace::{parse_record, parse_trace, read_trace};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn parses_records_in_capture_format() {
    let text = "(0, 1200, [140737488346872, 140737488346880], [4096])\n\
                (1, 35, [], [])\n\
                #eof\n";
    let workload = parse_trace(text).unwrap();

    assert_eq!(workload.len(), 2);
    let t0 = workload.thread(0).unwrap();
    assert_eq!(t0.instruction_count, 1200);
    assert_eq!(
        t0.reads().collect::<Vec<_>>(),
        [140737488346872, 140737488346880]
    );
    assert_eq!(t0.writes().collect::<Vec<_>>(), [4096]);
    assert!(workload.thread(1).unwrap().is_exhausted());
    assert_eq!(workload.total_operations(), 3);
}

#[test]
fn tolerates_whitespace_and_blank_lines() {
    let text = "\r\n  (7,3,[1,2],[3])  \r\n\n\t( 8 , 0 , [ 9 ] , [ ] )\r\n#eof\r\n";
    let workload = parse_trace(text).unwrap();

    assert_eq!(workload.thread(7).unwrap().reads().collect::<Vec<_>>(), [1, 2]);
    assert_eq!(workload.thread(8).unwrap().reads().collect::<Vec<_>>(), [9]);
    assert_eq!(workload.thread(8).unwrap().pending_writes(), 0);
}

#[test]
fn stops_at_eof_marker() {
    let text = "(1, 1, [64], [])\n#eof\nthis is not a record\n(1, 1, [], [])\n";
    let workload = parse_trace(text).unwrap();
    assert_eq!(workload.len(), 1);
}

#[test]
fn empty_trace_with_marker_is_empty_workload() {
    assert!(parse_trace("#eof\n").unwrap().is_empty());
}

#[test]
fn reads_from_any_bufread() {
    let data: &[u8] = b"(3, 9, [], [128, 256])\n#eof";
    let workload = read_trace(data).unwrap();
    assert_eq!(workload.thread(3).unwrap().pending_writes(), 2);
}

#[rstest]
#[case("")]
#[case("(1, 1, [], [])\n")]
#[case("(1, 1, [], [])\n\n   \n")]
fn missing_eof(#[case] text: &str) {
    assert!(matches!(parse_trace(text), Err(TraceError::MissingEof)));
}

#[test]
fn duplicate_thread_reports_second_line() {
    let text = "(4, 1, [], [])\n\n(4, 2, [1], [])\n#eof\n";
    assert!(matches!(
        parse_trace(text),
        Err(TraceError::DuplicateThread { line: 3, thread: 4 })
    ));
}

#[rstest]
#[case("1, 2, [], [])")]
#[case("(1, 2, [], []")]
#[case("(1)")]
#[case("(1, 2)")]
#[case("(1, 2, 3, [])")]
#[case("(1, 2, [4, [])")]
#[case("(1, 2, [4])")]
#[case("(1, 2, [4] [5])")]
#[case("(1, 2, [4], 5)")]
#[case("(1, 2, [4], [5)")]
#[case("(1, 2, [4], [[5]])")]
fn malformed_records(#[case] record: &str) {
    let err = parse_record(record, 12).unwrap_err();
    assert!(
        matches!(err, TraceError::Malformed { line: 12, .. }),
        "{record}: {err:?}"
    );
}

#[rstest]
#[case("(x, 2, [], [])", "thread id", "x")]
#[case("(1, -2, [], [])", "instruction count", "-2")]
#[case("(1, 2, [3, , 4], [])", "read address", "")]
#[case("(1, 2, [], [0x10])", "write address", "0x10")]
#[case("(1, 2, [18446744073709551616], [])", "read address", "18446744073709551616")]
#[case("(4294967296, 2, [], [])", "thread id", "4294967296")]
fn invalid_numbers(#[case] record: &str, #[case] field: &str, #[case] value: &str) {
    match parse_record(record, 5) {
        Err(TraceError::InvalidNumber {
            line,
            field: f,
            value: v,
        }) => {
            assert_eq!(line, 5);
            assert_eq!(f, field);
            assert_eq!(v, value);
        }
        other => panic!("{record}: unexpected {other:?}"),
    }
}

#[test]
fn error_line_numbers_count_blank_lines() {
    let text = "(1, 1, [], [])\n\n\n(2, 1, [oops], [])\n#eof\n";
    assert!(matches!(
        parse_trace(text),
        Err(TraceError::InvalidNumber { line: 4, .. })
    ));
}

#[test]
fn max_address_is_accepted() {
    let record = format!("(1, 0, [{}], [])", u64::MAX);
    let trace = parse_record(&record, 1).unwrap();
    assert_eq!(trace.reads().collect::<Vec<_>>(), [u64::MAX]);
}
