//! Diagnostic dump tests: automatic dumps, file logs and JSON reports.

use std::fs;

use super::common::{corrupt, recording_stack, Tamper};
use guardstack::{dump_context, Corruption, FileSink, GuardedStack, MemorySink, StackConfig};

/// One automatic dump per push and pop, attributed to the calling line.
#[test]
fn test_auto_dump_before_each_mutation() {
    let mut stack = recording_stack(&[1, 2]);
    stack.pop();

    let reports = stack.sink().reports();
    assert_eq!(reports.len(), 3);
    assert!(reports[2].context.file.ends_with("dump.rs"));
    assert_eq!(reports[2].context.function, "pop");
    assert_eq!(reports[2].size, 2, "dump is taken before the pop");
}

#[test]
fn test_no_auto_dump_when_disabled() {
    let mut stack = GuardedStack::with_sink(StackConfig::default(), MemorySink::new()).unwrap();
    stack.push(1);
    stack.pop();
    assert!(stack.sink().reports().is_empty());
}

#[test]
fn test_corrupted_dump_lists_problems_only() {
    let mut stack = recording_stack(&[1, 2, 3]);
    corrupt(&mut stack, Tamper::LeftStructGuard(0));
    stack.push(4);

    let last = stack.sink().reports().last().unwrap().clone();
    assert!(last.status.contains(Corruption::LeftCanaryScreams));
    assert_eq!(last.problems, vec![Corruption::LeftCanaryScreams.describe()]);
    assert!(last.slots.is_empty());
    assert!(last.guards.is_none());
}

#[test]
fn test_file_log_survives_stack_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log_file.txt");

    let sink = FileSink::create(&path).unwrap();
    let config = StackConfig::default().with_name("logged").with_dump(true);
    let mut stack = GuardedStack::with_sink(config, sink).unwrap();
    for value in 0..3 {
        stack.push(value);
    }
    stack.dump(&dump_context!("manual")).unwrap();
    let sink = stack.into_sink().unwrap();
    drop(sink);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("stack \"logged\"").count(), 4);
    assert!(text.contains("(manual)"));
    assert!(text.contains("[2] = 2"));
}

#[test]
fn test_report_serializes_to_json() {
    let stack = recording_stack(&[7]);
    let report = stack.report(&dump_context!("json"));

    let value: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["stack"], "recording");
    assert_eq!(value["size"], 1);
    assert_eq!(value["status"], serde_json::json!([]));
    assert_eq!(value["slots"][0]["value"], 7);
    assert_eq!(value["context"]["name"], "json");
}
