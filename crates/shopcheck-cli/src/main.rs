//! shopcheck CLI
//!
//! ## Usage
//!
//! ```bash
//! shopcheck templates list                      # Builtin templates by kind
//! shopcheck templates show form signup -f json  # One config
//! shopcheck templates check templates.yaml      # Validate a registry file
//! shopcheck evidence init --root Evidence       # Create evidence tree
//! shopcheck evidence clean                      # Drop empty video dirs
//! ```

use clap::Parser;
use shopcheck::logging;
use shopcheck_cli::{
    handlers::{evidence, templates},
    Cli, CliConfig, CliResult, ColorChoice, Commands, EvidenceCommand, Reporter,
    TemplatesCommand, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let format = if cli.log_json {
        logging::LogFormat::Json
    } else {
        logging::LogFormat::Compact
    };
    let _ = logging::init_with_format(logging::level_for(cli.verbose, cli.quiet), format);
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match run(&cli.command, &reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.failure(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands, reporter: &Reporter) -> CliResult<()> {
    match command {
        Commands::Templates(TemplatesCommand::List(args)) => templates::execute_list(reporter, args),
        Commands::Templates(TemplatesCommand::Show(args)) => templates::execute_show(reporter, args),
        Commands::Templates(TemplatesCommand::Check(args)) => {
            templates::execute_check(reporter, args)
        }
        Commands::Evidence(EvidenceCommand::Init(args)) => {
            evidence::execute_init(reporter, args).map(|_| ())
        }
        Commands::Evidence(EvidenceCommand::Clean(args)) => {
            evidence::execute_clean(reporter, args).map(|_| ())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(color)
}
