use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use tcstream_core::{CommandAssembler, Config, PathTranslator, RunSession, RunnerKind, TestTarget};

#[derive(Parser)]
#[command(name = "tcstream")]
#[command(about = "PHPUnit/Codeception TeamCity output parser and command builder", long_about = None)]
struct Cli {
    /// Config file (defaults to ./tcstream.toml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse runner output into JSON events, one per line
    Parse {
        /// Output file to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Workspace directory used for placeholders and path mapping
        #[arg(long)]
        cwd: Option<String>,

        /// Apply the configured path mapping to reported paths
        #[arg(long)]
        remote: bool,

        /// Print diagnostics for failed tests after the events
        #[arg(long)]
        diagnostics: bool,
    },
    /// Print the runner command for a target as JSON
    Command {
        /// Test file to run
        target: Option<String>,

        /// Narrow the run to one test method
        #[arg(long)]
        method: Option<String>,

        /// Test id; ids starting with `functional-unit` run through Codeception
        #[arg(long, default_value = "")]
        test_id: String,

        /// Extra runner arguments
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        args: String,

        /// Use the PHP debug options
        #[arg(long)]
        debug: bool,

        /// Working directory of the command
        #[arg(long)]
        cwd: Option<String>,
    },
    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse {
            file,
            cwd,
            remote,
            diagnostics,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let cwd = resolve_cwd(cwd)?;
            let translator = if remote {
                PathTranslator::with_mapping(cwd, &config.runner.paths)
            } else {
                PathTranslator::new(cwd)
            };
            parse_output(file, RunSession::new(translator), diagnostics)?;
        }
        Commands::Command {
            target,
            method,
            test_id,
            args,
            debug,
            cwd,
        } => {
            let config = load_config(cli.config.as_ref())?;
            config.runner.validate()?;

            let assembler = CommandAssembler::new(config.runner, resolve_cwd(cwd)?, debug);
            let kind = RunnerKind::for_target(&test_id);

            let selector = match (target, method) {
                (Some(file), Some(method)) => TestTarget::method(file, method).arguments(kind),
                (Some(file), None) => TestTarget::file(file).arguments(kind),
                (None, Some(_)) => return Err(eyre!("--method needs a target file")),
                (None, None) => String::new(),
            };

            let spec = assembler.build(&format!("{selector} {args}"), &test_id)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    Ok(config)
}

fn resolve_cwd(cwd: Option<String>) -> Result<String> {
    match cwd {
        Some(cwd) => Ok(cwd),
        None => Ok(std::env::current_dir()?.to_string_lossy().into_owned()),
    }
}

fn parse_output(file: Option<PathBuf>, mut session: RunSession, diagnostics: bool) -> Result<()> {
    let mut reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).wrap_err_with(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut chunk = Vec::new();

    loop {
        chunk.clear();
        if reader.read_until(b'\n', &mut chunk)? == 0 {
            break;
        }
        for event in session.push_bytes(&chunk) {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    for event in session.finish() {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
    }

    if session.records().is_empty() {
        tracing::warn!("no test records produced");
    }

    if diagnostics {
        for diagnostic in session.diagnostics() {
            writeln!(out, "{}", serde_json::to_string(&diagnostic)?)?;
        }
    }

    Ok(())
}
