//! Default values for tcstream configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "tcstream.toml";

/// Directory under the user config dir holding `config.toml`.
pub const USER_CONFIG_DIR: &str = "tcstream";

/// User config file name.
pub const USER_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Runner Defaults
// ============================================================================

/// Default PHP interpreter.
pub const DEFAULT_PHP: &str = "php";

/// Default PHPUnit (or ParaTest) binary, relative to the workspace.
pub const DEFAULT_PHPUNIT: &str = "vendor/bin/phpunit";

/// Default Codeception binary, relative to the workspace.
pub const DEFAULT_CODECEPT: &str = "vendor/bin/codecept";

/// Codeception suite run for functional targets.
pub const DEFAULT_CODECEPT_SUITE: &str = "unit";

/// PHPUnit configuration passed when the user gives none.
pub const DEFAULT_PHPUNIT_CONFIG: &str = "tests/unit/phpunit.xml";

/// Codeception configuration passed when the user gives none.
pub const DEFAULT_CODECEPT_CONFIG: &str = "tests/functional-unit/codeception.yml";

/// PHP options added when a debug session is requested.
pub const DEFAULT_PHP_DEBUG_OPTIONS: &[&str] = &["-dxdebug.mode=debug", "-dxdebug.start_with_request=yes"];

// ============================================================================
// Environment Overrides
// ============================================================================

pub const ENV_PHP: &str = "TCSTREAM_PHP";
pub const ENV_PHPUNIT: &str = "TCSTREAM_PHPUNIT";
pub const ENV_CODECEPT: &str = "TCSTREAM_CODECEPT";
pub const ENV_COMMAND: &str = "TCSTREAM_COMMAND";
pub const ENV_ARGS: &str = "TCSTREAM_ARGS";
