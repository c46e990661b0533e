//! Regex grammars for plain-text report lines.

/// Tool banner: `PHPUnit 10.5.2 by ...`, `ParaTest v7.3.1`,
/// `Codeception PHP Testing Framework v5.0.12`.
pub const VERSION_PATTERN: &str =
    r"^\s*(?P<tool>PHPUnit|ParaTest|Codeception PHP Testing Framework)\s+v?(?P<version>\d[\w.\-]*)";

/// `Runtime:       PHP 8.2.13 with Xdebug 3.3.1`
pub const RUNTIME_PATTERN: &str = r"^\s*Runtime:\s+(?P<runtime>.+?)\s*$";

/// `Configuration: /app/phpunit.xml`
pub const CONFIGURATION_PATTERN: &str = r"^\s*Configuration:\s+(?P<configuration>.+?)\s*$";

/// `Processes:     8`
pub const PROCESSES_PATTERN: &str = r"^\s*Processes:\s+(?P<processes>\d+)";

/// `Time: 00:00.049, Memory: 6.00 MB` or `Time: 49 ms, Memory: 6.00 MB`
pub const TIME_AND_MEMORY_PATTERN: &str =
    r"Time:\s(?P<time>[\d+:.]+(?:\s\w+)?),\sMemory:\s(?P<memory>[\d.]+\s\w+)";

/// Optional trailing categories of the summary line.
pub const SUMMARY_CATEGORIES: &[&str] = &[
    "Errors",
    "Failures",
    "Warnings",
    "Skipped",
    "Incomplete",
    "Risky",
    "Deprecations",
    "Notices",
];

/// `Tests: 5, Assertions: 10, Failures: 1, Skipped: 0.` without the
/// category alternation, which is filled in from [`SUMMARY_CATEGORIES`].
pub const SUMMARY_PREFIX_PATTERN: &str = r"^\s*Tests:\s(\d+)[.\s,]\s?Assertions:\s(\d+)[.\s,]?\s?";

/// One `Label: N` pair inside a summary line, starting the line or following
/// a separator. `PHPUnit Deprecations: N` is a separate category and does
/// not match.
pub const SUMMARY_ITEM_PATTERN: &str = r"(?:^\s*|[,.]\s*)(?P<name>\w+):\s(?P<count>\d+)";

/// `OK (3 tests, 7 assertions)`
pub const SUMMARY_OK_PATTERN: &str =
    r"^\s*OK\s\((?P<tests>\d+)\stests?,\s(?P<assertions>\d+)\sassertions?\)";

/// Summary pattern including every known trailing category.
pub fn summary_pattern() -> String {
    format!(
        r"{SUMMARY_PREFIX_PATTERN}((?:{}):\s(\d+)[.\s,]?\s?)*",
        SUMMARY_CATEGORIES.join("|")
    )
}
