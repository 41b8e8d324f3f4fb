//! jobscan - scan job postings for relocation support and employment type

use clap::Parser;

use jobscan::cli::{Cli, Commands, SettingsCommands};
use jobscan::error::Result;
use jobscan::logging::configure_logging;

mod commands;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            target,
            frames,
            json,
            html,
            no_ai,
        } => commands::cmd_analyze(&target, frames, json, html, no_ai),

        Commands::Settings(SettingsCommands::Show { json }) => commands::cmd_settings_show(json),
        Commands::Settings(SettingsCommands::Set {
            api_key,
            enable_ai,
            auto_hide,
            show_always,
        }) => commands::cmd_settings_set(api_key, enable_ai, auto_hide, show_always),
    }
}
