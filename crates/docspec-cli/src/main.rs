// crates/docspec-cli/src/main.rs
// ============================================================================
// Module: Docspec CLI Entry Point
// Description: Command dispatcher for running and linting fixture documents.
// Purpose: Provide the `docspec` binary over the docspec engine.
// Dependencies: clap, docspec-config, docspec-core, thiserror.
// ============================================================================

//! ## Overview
//! `docspec run` discovers fixture documents, evaluates every case, writes the
//! JSON report, and exits non-zero when any case failed. `docspec lint`
//! reports assertion-health findings without running anything, and
//! `docspec capabilities` lists the supported capability names. Usage errors
//! exit with status 2; fatal run errors print `ERROR: <message>` and exit 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use docspec_cli::t;
use docspec_config::DocspecConfig;
use docspec_config::LogSinkKind;
use docspec_core::CapabilitySet;
use docspec_core::CaseFormat;
use docspec_core::CaseStatus;
use docspec_core::CaseWarning;
use docspec_core::DocumentSource;
use docspec_core::ProcessEnvironment;
use docspec_core::Runner;
use docspec_core::discover_documents;
use docspec_core::lint_case;
use docspec_core::load_document;
use docspec_core::write_report;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Exit status for invalid invocations.
const USAGE_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "docspec", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run fixture cases and write a JSON report.
    Run(RunCommand),
    /// Report assertion-health findings without running cases.
    Lint(LintCommand),
    /// List supported capability names.
    Capabilities,
}

/// Case selection arguments shared by `run` and `lint`.
#[derive(Args, Debug, Clone)]
struct CaseArgs {
    /// Fixture document or directory of documents.
    #[arg(long, value_name = "PATH")]
    cases: PathBuf,
    /// Config file (defaults to `DOCSPEC_CONFIG`, then `docspec.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Markdown file glob used when `--cases` is a directory.
    #[arg(long = "case-file-pattern", value_name = "GLOB")]
    case_file_pattern: Option<String>,
    /// Enabled fixture formats, comma separated (`md,yaml,json`).
    #[arg(long = "case-formats", value_name = "LIST")]
    case_formats: Option<String>,
}

/// Arguments for `docspec run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Case selection.
    #[command(flatten)]
    cases: CaseArgs,
    /// Report output path.
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
    /// Run event sink.
    #[arg(long = "log-sink", value_enum, value_name = "SINK")]
    log_sink: Option<LogSinkArg>,
    /// Run event log file for the `file` sink.
    #[arg(long = "log-path", value_name = "PATH")]
    log_path: Option<PathBuf>,
}

/// Arguments for `docspec lint`.
#[derive(Args, Debug)]
struct LintCommand {
    /// Case selection.
    #[command(flatten)]
    cases: CaseArgs,
}

/// Run event sink selection.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LogSinkArg {
    /// Drop events.
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `--log-path`.
    File,
}

impl From<LogSinkArg> for LogSinkKind {
    fn from(value: LogSinkArg) -> Self {
        match value {
            LogSinkArg::None => Self::None,
            LogSinkArg::Stderr => Self::Stderr,
            LogSinkArg::File => Self::File,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying the exit status to use.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// True when the invocation itself was invalid.
    usage: bool,
}

impl CliError {
    /// Constructs a fatal run error.
    const fn new(message: String) -> Self {
        Self {
            message,
            usage: false,
        }
    }

    /// Constructs a usage error.
    const fn usage(message: String) -> Self {
        Self {
            message,
            usage: true,
        }
    }

    /// Returns the process exit status for this error.
    fn exit_code(&self) -> ExitCode {
        if self.usage { ExitCode::from(USAGE_EXIT_CODE) } else { ExitCode::FAILURE }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version)).map_err(stdout_error)?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(command),
        Commands::Lint(command) => command_lint(&command),
        Commands::Capabilities => command_capabilities(),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(stdout_error)?;
    write_stdout_line("").map_err(stdout_error)
}

// ============================================================================
// SECTION: Case Selection
// ============================================================================

/// Resolved inputs for a command that reads fixture documents.
struct Prepared {
    /// Merged configuration (file, environment, flags).
    config: DocspecConfig,
    /// Environment snapshot taken once at startup.
    environment: ProcessEnvironment,
    /// Documents to process, in run order.
    sources: Vec<DocumentSource>,
}

/// Loads configuration, applies case flags, and discovers documents.
fn prepare(args: &CaseArgs) -> CliResult<Prepared> {
    let environment = ProcessEnvironment::capture();
    let mut config = DocspecConfig::load(args.config.as_deref(), environment.vars())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    apply_case_flags(&mut config, args)?;
    if !args.cases.exists() {
        return Err(CliError::usage(t!("cases.missing", path = args.cases.display())));
    }
    let sources = discover_documents(&args.cases, &config.discovery_options())
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(Prepared {
        config,
        environment,
        sources,
    })
}

/// Applies `--case-file-pattern` and `--case-formats` over the config.
fn apply_case_flags(config: &mut DocspecConfig, args: &CaseArgs) -> CliResult<()> {
    if let Some(pattern) = &args.case_file_pattern {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(CliError::usage(t!("cases.pattern_empty")));
        }
        config.cases.pattern = pattern.to_string();
    }
    if let Some(formats) = &args.case_formats {
        config.cases.formats = CaseFormat::parse_list(formats)
            .map_err(|err| CliError::usage(t!("cases.formats_invalid", error = err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let Prepared {
        mut config,
        environment,
        sources,
    } = prepare(&command.cases)?;
    if let Some(sink) = command.log_sink {
        config.logging.sink = sink.into();
    }
    if let Some(path) = command.log_path {
        config.logging.path = Some(path);
    }
    config.validate().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let sink = config
        .logging
        .open_sink()
        .map_err(|err| CliError::new(t!("run.log_open_failed", error = err)))?;

    let runner = Runner::new(config.run_settings(), environment).with_sink(sink);
    let outcome =
        runner.run(&sources).map_err(|err| CliError::new(t!("run.failed", error = err)))?;
    for warning in &outcome.warnings {
        write_stderr_line(&health_warning_line(warning)).map_err(stderr_error)?;
    }

    let report = &outcome.report;
    write_report(&command.out, report).map_err(|err| {
        CliError::new(t!("run.report_failed", path = command.out.display(), error = err))
    })?;
    write_stdout_line(&t!("run.wrote", path = command.out.display())).map_err(stdout_error)?;
    write_stdout_line(&t!(
        "run.summary",
        total = report.results.len(),
        passed = report.count(CaseStatus::Pass),
        failed = report.count(CaseStatus::Fail),
        skipped = report.count(CaseStatus::Skip),
    ))
    .map_err(stdout_error)?;

    Ok(if report.has_failures() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Formats an advisory assertion-health warning.
fn health_warning_line(warning: &CaseWarning) -> String {
    t!(
        "run.warn.assert_health",
        code = warning.diagnostic.code,
        path = warning.diagnostic.path,
        message = warning.diagnostic.message,
    )
}

// ============================================================================
// SECTION: Lint Command
// ============================================================================

/// Executes the `lint` command.
fn command_lint(command: &LintCommand) -> CliResult<ExitCode> {
    let Prepared {
        config,
        sources,
        ..
    } = prepare(&command.cases)?;
    let settings = config.run_settings();
    let mut checked = 0_usize;
    let mut issues = 0_usize;
    for source in &sources {
        let cases = load_document(source, settings.normalize, settings.max_fixture_bytes)
            .map_err(|err| CliError::new(err.to_string()))?;
        for case in &cases {
            checked += 1;
            match lint_case(case) {
                Ok(diagnostics) => {
                    for diagnostic in diagnostics {
                        issues += 1;
                        write_stdout_line(&t!(
                            "lint.diagnostic",
                            case_id = case.id,
                            code = diagnostic.code,
                            path = diagnostic.path,
                            message = diagnostic.message,
                        ))
                        .map_err(stdout_error)?;
                    }
                }
                Err(err) => {
                    issues += 1;
                    write_stdout_line(&t!(
                        "lint.invalid",
                        case_id = case.id,
                        category = err.category().as_str(),
                        message = err.message(),
                    ))
                    .map_err(stdout_error)?;
                }
            }
        }
    }
    if issues == 0 {
        write_stdout_line(&t!("lint.clean", count = checked)).map_err(stdout_error)?;
        return Ok(ExitCode::SUCCESS);
    }
    write_stdout_line(&t!("lint.summary", count = checked, issues = issues))
        .map_err(stdout_error)?;
    Ok(ExitCode::FAILURE)
}

// ============================================================================
// SECTION: Capabilities Command
// ============================================================================

/// Executes the `capabilities` command.
fn command_capabilities() -> CliResult<ExitCode> {
    for name in CapabilitySet::supported().iter() {
        write_stdout_line(name).map_err(stdout_error)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Wraps a stdout write failure.
fn stdout_error(error: std::io::Error) -> CliError {
    CliError::new(t!("output.write_failed", stream = t!("output.stream.stdout"), error = error))
}

/// Wraps a stderr write failure.
fn stderr_error(error: std::io::Error) -> CliError {
    CliError::new(t!("output.write_failed", stream = t!("output.stream.stderr"), error = error))
}

/// Emits an error to stderr and returns the matching exit code.
fn emit_error(error: &CliError) -> ExitCode {
    let _ = write_stderr_line(&t!("main.error", error = error));
    error.exit_code()
}
