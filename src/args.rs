//! Command-line argument parsing and processing.
//!
//! Arguments are parsed with clap, then reduced to a [`CliAction`] for the main
//! application logic. Help and version output use the application's own log
//! style instead of clap's.

use clap::Parser;
use std::path::PathBuf;

use crate::logger::Log;

#[derive(Parser, Debug)]
#[command(name = "dawnr", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Load the configuration from this file instead of the default location
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print today's timeline and exit
    #[arg(short = 't', long)]
    timeline: bool,

    /// Enable detailed debug output
    #[arg(short = 'd', long)]
    debug: bool,

    #[arg(short = 'h', long)]
    help: bool,

    #[arg(short = 'V', long, short_alias = 'v')]
    version: bool,
}

/// Settings shared by the actions that load a configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunOptions {
    pub debug_enabled: bool,
    pub config_path: Option<PathBuf>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon
    Run(RunOptions),
    /// Print the timeline and exit
    ShowTimeline(RunOptions),
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments (including the program name) into an action.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                let message = e.to_string();
                let first_line = message.lines().next().unwrap_or("Invalid arguments");
                Log::log_warning(first_line.trim_start_matches("error: "));
                return ParsedArgs {
                    action: CliAction::ShowHelpDueToError,
                };
            }
        };

        let options = RunOptions {
            debug_enabled: cli.debug,
            config_path: cli.config,
        };

        let action = if cli.version {
            CliAction::ShowVersion
        } else if cli.help {
            CliAction::ShowHelp
        } else if cli.timeline {
            CliAction::ShowTimeline(options)
        } else {
            CliAction::Run(options)
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args_os()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args_os())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: dawnr [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("-c, --config <PATH>  Use this configuration file");
    Log::log_indented("-d, --debug          Enable detailed debug output");
    Log::log_indented("-h, --help           Print help information");
    Log::log_indented("-t, --timeline       Print today's timeline and exit");
    Log::log_indented("-V, --version        Print version information");
    Log::log_end();
}
