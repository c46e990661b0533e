use tcstream_core::command::{CommandError, RunnerKind};
use tcstream_core::{CommandAssembler, PathMapping, RunnerConfig, TestTarget};

fn local_config() -> RunnerConfig {
    RunnerConfig::default()
}

fn docker_config() -> RunnerConfig {
    RunnerConfig {
        command: "docker compose exec -T app".to_string(),
        paths: vec![PathMapping::new("${workspaceFolder}", "/app")],
        ..RunnerConfig::default()
    }
}

#[test]
fn test_local_phpunit_command() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let spec = assembler.build("/w/tests/unit/FooTest.php", "").unwrap();

    assert_eq!(spec.executable, "php");
    assert_eq!(
        spec.arguments,
        vec![
            "vendor/bin/phpunit",
            "/w/tests/unit/FooTest.php",
            "--colors=never",
            "--teamcity",
            "--configuration=tests/unit/phpunit.xml",
        ]
    );
    assert_eq!(spec.working_directory, "/w");
    assert!(!assembler.is_remote());
}

#[test]
fn test_method_filter() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let target = TestTarget::method("tests/unit/FooTest.php", "testBar");
    let spec = assembler.build(&target.arguments(RunnerKind::PhpUnit), "unit.FooTest::testBar").unwrap();

    assert!(spec
        .arguments
        .contains(&"--filter=^.*::(testBar)( with data set .*)?$".to_string()));
    assert!(spec.arguments.contains(&"tests/unit/FooTest.php".to_string()));
}

#[test]
fn test_denied_flags_are_replaced() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let spec = assembler
        .build("--teamcity --colors=always --testdox --stop-on-failure", "")
        .unwrap();

    let args = spec.arguments;
    assert_eq!(args.iter().filter(|a| a.as_str() == "--teamcity").count(), 1);
    assert!(args.contains(&"--colors=never".to_string()));
    assert!(!args.contains(&"--colors=always".to_string()));
    assert!(!args.contains(&"--testdox".to_string()));
    assert!(args.contains(&"--stop-on-failure".to_string()));
}

#[test]
fn test_user_configuration_wins() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let spec = assembler.build("-c phpunit.dist.xml", "").unwrap();

    assert!(spec.arguments.contains(&"--configuration=phpunit.dist.xml".to_string()));
    assert!(!spec
        .arguments
        .contains(&"--configuration=tests/unit/phpunit.xml".to_string()));
}

#[test]
fn test_configured_args_are_appended() {
    let config = RunnerConfig {
        args: vec!["--group".to_string(), "fast lane".to_string()],
        ..local_config()
    };
    let assembler = CommandAssembler::new(config, "/w", false);
    let spec = assembler.build("tests/FooTest.php", "").unwrap();
    assert!(spec.arguments.contains(&"--group=fast lane".to_string()));
}

#[test]
fn test_percent_encoded_positional() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let spec = assembler.build("tests/My%20FooTest.php", "").unwrap();
    assert!(spec.arguments.contains(&"tests/My FooTest.php".to_string()));
}

#[test]
fn test_debug_uses_debug_options() {
    let config = RunnerConfig {
        php_options: vec!["-dmemory_limit=-1".to_string()],
        php_debug_options: vec!["-dxdebug.mode=debug".to_string()],
        ..local_config()
    };

    let normal = CommandAssembler::new(config.clone(), "/w", false).build("", "").unwrap();
    assert_eq!(normal.arguments[0], "-dmemory_limit=-1");

    let debug = CommandAssembler::new(config, "/w", true).build("", "").unwrap();
    assert_eq!(debug.arguments[0], "-dxdebug.mode=debug");
}

#[test]
fn test_codeception_target() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let target = TestTarget::method("/w/tests/functional-unit/FooCest.php", "testBar");
    let spec = assembler
        .build(
            &target.arguments(RunnerKind::Codeception),
            "functional-unit.FooCest::testBar",
        )
        .unwrap();

    assert_eq!(
        spec.arguments,
        vec![
            "vendor/bin/codecept",
            "run",
            "unit",
            "tests/functional-unit/FooCest.php:testBar",
            "--no-colors",
            "--no-artifacts",
            "--config=tests/functional-unit/codeception.yml",
        ]
    );
}

#[test]
fn test_remote_command_maps_and_joins() {
    let assembler = CommandAssembler::new(docker_config(), "/home/dev/app", false);
    let spec = assembler.build("/home/dev/app/tests/FooTest.php", "").unwrap();

    assert!(assembler.is_remote());
    assert_eq!(spec.executable, "docker");
    assert_eq!(
        spec.arguments,
        vec![
            "compose",
            "exec",
            "-T",
            "app",
            "php vendor/bin/phpunit /app/tests/FooTest.php '--colors=never' '--teamcity' '--configuration=tests/unit/phpunit.xml'",
        ]
    );
}

#[test]
fn test_remote_translate_event() {
    let assembler = CommandAssembler::new(docker_config(), "/home/dev/app", false);
    let mut session = assembler.session();
    let events = session.push_chunk(
        "##teamcity[testStarted name='testBar' locationHint='php_qn:///app/tests/FooTest.php::FooTest::testBar' flowId='1']\n",
    );

    let (_, test) = events[0].as_lifecycle().unwrap();
    assert_eq!(test.file.as_deref(), Some("/home/dev/app/tests/FooTest.php"));

    let translated = assembler.translate(
        tcstream_core::EventParser::new()
            .parse("##teamcity[testStarted name='testBar' locationHint='php_qn:///app/tests/FooTest.php::FooTest::testBar' flowId='1']")
            .unwrap(),
    );
    assert_eq!(
        translated.as_lifecycle().unwrap().1.location_hint.as_deref(),
        Some("php_qn:///home/dev/app/tests/FooTest.php::FooTest::testBar")
    );
}

#[test]
fn test_paratest_functional_flag() {
    let config = RunnerConfig {
        phpunit: "vendor/bin/paratest".to_string(),
        ..local_config()
    };
    let assembler = CommandAssembler::new(config, "/w", false);

    let filtered = assembler.build("--filter testBar", "").unwrap();
    assert_eq!(filtered.arguments.last().map(String::as_str), Some("-f"));

    let plain = assembler.build("tests/FooTest.php", "").unwrap();
    assert!(!plain.arguments.contains(&"-f".to_string()));
}

#[test]
fn test_missing_binary() {
    let config = RunnerConfig {
        codecept: String::new(),
        ..local_config()
    };
    let assembler = CommandAssembler::new(config, "/w", false);
    assert!(matches!(
        assembler.build("", "functional-unit.FooCest"),
        Err(CommandError::MissingBinary(RunnerKind::Codeception))
    ));
}

#[test]
fn test_malformed_arguments() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    assert!(matches!(
        assembler.build("--filter 'unterminated", ""),
        Err(CommandError::InvalidArguments { .. })
    ));
}

#[test]
fn test_each_build_is_a_new_spec() {
    let assembler = CommandAssembler::new(local_config(), "/w", false);
    let first = assembler.build("tests/ATest.php", "").unwrap();
    let second = assembler.build("tests/BTest.php", "").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_remote_decoded_path_with_space_stays_one_word() {
    let assembler = CommandAssembler::new(docker_config(), "/home/dev/app", false);
    let spec = assembler
        .build("/home/dev/app/tests/My%20FooTest.php", "")
        .unwrap();

    let joined = spec.arguments.last().unwrap();
    assert!(joined.contains("'/app/tests/My FooTest.php'"));
    let words = shell_words::split(joined).unwrap();
    assert!(words.contains(&"/app/tests/My FooTest.php".to_string()));
}
