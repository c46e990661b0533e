use tcstream_core::event::{ProcessCount, TimeAndMemory, ToolVersion};
use tcstream_core::{Detail, EventKind, EventParser, ParsedEvent, ResultSummary};

fn lifecycle(event: &ParsedEvent) -> (EventKind, &tcstream_core::TestEvent) {
    event.as_lifecycle().expect("lifecycle event")
}

#[test]
fn test_test_started_with_location_hint() {
    let parser = EventParser::new();
    let event = parser
        .parse("##teamcity[testStarted name='T' flowId='1' locationHint='php_qn://tests/unit/FooTest.php::Foo::bar']")
        .unwrap();

    let (kind, test) = lifecycle(&event);
    assert_eq!(kind, EventKind::TestStarted);
    assert_eq!(test.name, "T");
    assert_eq!(test.flow_id, 1);
    assert_eq!(test.file.as_deref(), Some("tests/unit/FooTest.php"));
    assert_eq!(test.id.as_deref(), Some("Foo::bar"));
    assert_eq!(test.test_id.as_deref(), Some("unit.Foo::bar"));
}

#[test]
fn test_suite_started_with_namespaced_class() {
    let parser = EventParser::new();
    let event = parser
        .parse("##teamcity[testSuiteStarted name='Tests\\Unit\\FooTest' locationHint='php_qn:///app/tests/Unit/FooTest.php::\\Tests\\Unit\\FooTest' flowId='8024']")
        .unwrap();

    let (kind, test) = lifecycle(&event);
    assert_eq!(kind, EventKind::SuiteStarted);
    assert_eq!(test.name, "Tests\\Unit\\FooTest");
    assert_eq!(test.file.as_deref(), Some("/app/tests/Unit/FooTest.php"));
    assert_eq!(test.id.as_deref(), Some("Tests\\Unit\\FooTest"));
}

#[test]
fn test_test_failed_folds_details() {
    let parser = EventParser::new();
    let line = "##teamcity[testFailed name='testFail' message='Failed asserting that false is true.' details=' /app/tests/FooTest.php:22|n ' duration='3' flowId='8024']";
    let event = parser.parse(line).unwrap();

    let (kind, test) = lifecycle(&event);
    assert_eq!(kind, EventKind::TestFailed);
    assert_eq!(test.message.as_deref(), Some("Failed asserting that false is true."));
    assert_eq!(
        test.details,
        Some(vec![Detail {
            file: "/app/tests/FooTest.php".to_string(),
            line: 22,
        }])
    );
    assert_eq!(test.duration, Some(3));
}

#[test]
fn test_message_locations_move_into_details() {
    let parser = EventParser::new();
    let line = "##teamcity[testFailed name='testError' message='Exception: boom|n|n/app/src/Foo.php:10' details=' /app/tests/FooTest.php:30|n' flowId='1']";
    let event = parser.parse(line).unwrap();

    let (_, test) = lifecycle(&event);
    assert_eq!(test.message.as_deref(), Some("Exception: boom"));
    let details = test.details.as_ref().unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].file, "/app/src/Foo.php");
    assert_eq!(details[1].line, 30);
}

#[test]
fn test_comparison_failure_fields() {
    let parser = EventParser::new();
    let line = "##teamcity[testFailed name='testSame' message='Failed asserting that two strings are identical.' details=' /app/tests/FooTest.php:9|n' type='comparisonFailure' actual='|'bar|'' expected='|'foo|'' flowId='1']";
    let event = parser.parse(line).unwrap();

    let (_, test) = lifecycle(&event);
    assert_eq!(test.failure_type.as_deref(), Some("comparisonFailure"));
    assert_eq!(test.actual.as_deref(), Some("'bar'"));
    assert_eq!(test.expected.as_deref(), Some("'foo'"));
}

#[test]
fn test_escaped_characters_in_name() {
    let parser = EventParser::new();
    let event = parser
        .parse("##teamcity[testStarted name='testAdd with data set |[0|]' flowId='1']")
        .unwrap();
    assert_eq!(lifecycle(&event).1.name, "testAdd with data set [0]");
}

#[test]
fn test_test_count() {
    let parser = EventParser::new();
    assert_eq!(
        parser.parse("##teamcity[testCount count='12' flowId='7']"),
        Some(ParsedEvent::TestCount(tcstream_core::event::TestCount {
            count: 12,
            flow_id: 7
        }))
    );
}

#[test]
fn test_lifecycle_without_flow_id_is_dropped() {
    let parser = EventParser::new();
    assert!(parser.parse("##teamcity[testStarted name='testFoo']").is_none());
    assert!(parser.parse("##teamcity[testStarted flowId='1']").is_none());
}

#[test]
fn test_unknown_command_is_dropped() {
    let parser = EventParser::new();
    assert!(parser.parse("##teamcity[buildStatisticValue key='x' value='1']").is_none());
}

#[test]
fn test_result_summary() {
    let parser = EventParser::new();
    let event = parser
        .parse("Tests: 5, Assertions: 10, Failures: 1, Skipped: 0.")
        .unwrap();

    assert_eq!(
        event,
        ParsedEvent::ResultSummary(ResultSummary {
            tests: Some(5),
            assertions: Some(10),
            failures: Some(1),
            skipped: Some(0),
            ..ResultSummary::default()
        })
    );
}

#[test]
fn test_ok_summary() {
    let parser = EventParser::new();
    let event = parser.parse("OK (3 tests, 7 assertions)").unwrap();
    assert_eq!(
        event,
        ParsedEvent::ResultSummary(ResultSummary {
            tests: Some(3),
            assertions: Some(7),
            ..ResultSummary::default()
        })
    );
}

#[test]
fn test_banner_lines() {
    let parser = EventParser::new();

    assert_eq!(
        parser.parse("PHPUnit 9.5.10 by Sebastian Bergmann and contributors."),
        Some(ParsedEvent::ToolVersion(ToolVersion {
            tool: "PHPUnit".to_string(),
            version: "9.5.10".to_string(),
        }))
    );
    assert_eq!(
        parser.parse("Processes:     8"),
        Some(ParsedEvent::ProcessCount(ProcessCount { processes: 8 }))
    );
    assert_eq!(
        parser.parse("Time: 00:00.049, Memory: 6.00 MB"),
        Some(ParsedEvent::TimeAndMemory(TimeAndMemory {
            time: "00:00.049".to_string(),
            memory: "6.00 MB".to_string(),
        }))
    );
}

#[test]
fn test_garbage_lines_produce_nothing() {
    let parser = EventParser::new();
    for line in [
        "",
        "   ",
        "..F.S",
        "PHP Warning:  Undefined variable $x",
        "##teamcity[",
        "##teamcity[testStarted name='unterminated flowId='1']",
        "##teamcity[]",
        "\u{1b}[31mFAILURES!\u{1b}[0m",
    ] {
        assert!(parser.parse(line).is_none(), "expected no event for {line:?}");
    }
}
