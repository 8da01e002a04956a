mod cli;
mod commands;
mod config;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConnectionArgs};
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub connection: ConnectionArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        connection: cli.connection,
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            if let Some(api_err) = err.chain().find_map(|e| e.downcast_ref::<opsman::Error>()) {
                ui::dim(api_err.category().advice());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::ApplyChanges(args) => commands::apply_changes::run(ctx, &args),
        Command::Diff(args) => commands::apply_changes::diff(ctx, &args),
        Command::ToggleErrands(args) => commands::toggle_errands::run(ctx, &args),
        Command::Errands(args) => commands::errands::run(ctx, &args),
        Command::Manifests { staged } => commands::manifests::run(ctx, staged),
        Command::StemcellUpdates => commands::reports::stemcell_updates(ctx),
        Command::Diagnostics => commands::reports::diagnostics(ctx),
        Command::ListTiles => commands::tiles::list(ctx),
        Command::TileGuid { slug } => commands::tiles::guid(ctx, &slug),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "omen", &mut io::stdout());
            Ok(())
        }
    }
}
