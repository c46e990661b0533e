use tcstream_core::{EventKind, PathMapping, PathTranslator, RunSession, Severity, TestStatus};

const PHPUNIT_OUTPUT: &str = "PHPUnit 10.5.2 by Sebastian Bergmann and contributors.

Runtime:       PHP 8.2.13
Configuration: /app/phpunit.xml

##teamcity[testCount count='3' flowId='42']
##teamcity[testSuiteStarted name='Tests\\Unit\\FooTest' locationHint='php_qn:///app/tests/unit/FooTest.php::\\Tests\\Unit\\FooTest' flowId='42']
##teamcity[testStarted name='testPass' locationHint='php_qn:///app/tests/unit/FooTest.php::\\Tests\\Unit\\FooTest::testPass' flowId='42']
##teamcity[testFinished name='testPass' duration='1' flowId='42']
##teamcity[testStarted name='testFail' locationHint='php_qn:///app/tests/unit/FooTest.php::\\Tests\\Unit\\FooTest::testFail' flowId='42']
##teamcity[testFailed name='testFail' message='Failed asserting that false is true.' details=' /app/tests/unit/FooTest.php:17|n' duration='2' flowId='42']
##teamcity[testFinished name='testFail' duration='2' flowId='42']
##teamcity[testStarted name='testSkip' locationHint='php_qn:///app/tests/unit/FooTest.php::\\Tests\\Unit\\FooTest::testSkip' flowId='42']
##teamcity[testIgnored name='testSkip' message='not today' details=' /app/tests/unit/FooTest.php:25|n' duration='0' flowId='42']
##teamcity[testFinished name='testSkip' duration='0' flowId='42']
##teamcity[testSuiteFinished name='Tests\\Unit\\FooTest' flowId='42']
Time: 00:00.012, Memory: 8.00 MB

Tests: 3, Assertions: 3, Failures: 1, Skipped: 1.
";

fn remote_session() -> RunSession {
    RunSession::new(PathTranslator::with_mapping(
        "/home/dev/project",
        &[PathMapping::new("/home/dev/project", "/app")],
    ))
}

#[test]
fn test_full_run_in_small_chunks() {
    let mut session = remote_session();

    let bytes = PHPUNIT_OUTPUT.as_bytes();
    let mut events = Vec::new();
    for chunk in bytes.chunks(17) {
        events.extend(session.push_chunk(std::str::from_utf8(chunk).unwrap()));
    }
    events.extend(session.finish());

    assert_eq!(events.first().map(|e| e.name()), Some("toolVersion"));
    assert_eq!(events.last().map(|e| e.name()), Some("resultSummary"));

    let records = session.records();
    assert_eq!(records.len(), 4);

    let fail = session.correlator().get("testFail", 42).unwrap();
    assert_eq!(fail.kind, EventKind::TestFailed);
    assert_eq!(fail.status(), TestStatus::Failure);
    assert_eq!(fail.test.file.as_deref(), Some("/home/dev/project/tests/unit/FooTest.php"));
    assert_eq!(fail.test.test_id.as_deref(), Some("unit.Tests\\Unit\\FooTest::testFail"));

    let summary = session.summary().unwrap();
    assert_eq!(summary.failures, Some(1));
    assert!(!summary.is_successful());
}

#[test]
fn test_diagnostics_for_problems() {
    let mut session = remote_session();
    session.push_chunk(PHPUNIT_OUTPUT);

    let diagnostics = session.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].file, "/home/dev/project/tests/unit/FooTest.php");
    assert_eq!(diagnostics[0].line, 17);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[1].line, 25);
}

#[test]
fn test_no_output_no_records() {
    let mut session = remote_session();
    session.push_chunk("PHP Fatal error:  Uncaught Error: Class not found\n");
    assert!(session.finish().is_empty());
    assert!(session.records().is_empty());
    assert!(session.summary().is_none());
}

#[test]
fn test_invalid_utf8_noise_keeps_stream_flowing() {
    let mut session = remote_session();
    let mut output = Vec::new();
    output.extend_from_slice(b"##teamcity[testStarted name='testA' flowId='5']\n");
    output.extend_from_slice(b"latin1 \xe9 output\n");
    output.extend_from_slice(b"##teamcity[testFinished name='testA' duration='4' flowId='5']\n");

    let events = session.push_bytes(&output);

    assert_eq!(events.len(), 2);
    assert_eq!(events[1].name(), "testFinished");
    let record = session.correlator().get("testA", 5).unwrap();
    assert_eq!(record.kind, EventKind::TestFinished);
    assert_eq!(record.test.duration, Some(4));
}
