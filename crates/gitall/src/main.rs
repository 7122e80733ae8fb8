#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Command-line interface for batch-managing git repositories via libgitall.

use std::io::{self, IsTerminal};
use std::process;

use anyhow::Result;
use clap::Parser;
use libgitall::{GitallError, PullOptions};
use libgitall::github::ListOptions;
use termcolor::{ColorChoice, StandardStream};

use crate::args::{Cli, Commands, ConfigCommands};
use crate::commands::Context;

/// Argument surface.
mod args;
/// Subcommand implementations.
mod commands;
/// Colorized and JSON rendering.
mod render;
/// Target repository resolution.
mod resolve;

/// CLI entrypoint.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let color = if cli.color {
        ColorChoice::Always
    } else if cli.no_color || !io::stdout().is_terminal() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let ctx = Context {
        quiet: cli.quiet,
        json: cli.json,
        color,
    };

    if let Err(err) = run(cli, &ctx) {
        let mut stderr = StandardStream::stderr(ctx.color);
        if render::error_line(&mut stderr, &format!("{err:#}")).is_err() {
            eprintln!("error: {err:#}");
        }
        let exit_code = err
            .downcast_ref::<GitallError>()
            .map_or(1, GitallError::exit_code);
        process::exit(exit_code);
    }
    Ok(())
}

/// Dispatch the selected subcommand.
fn run(cli: Cli, ctx: &Context) -> Result<()> {
    match cli.command {
        Commands::Clone {
            user,
            dir,
            protocol,
            concurrency,
            dry_run,
            no_forks,
            no_archived,
            filter,
        } => commands::clone::run(
            ctx,
            commands::clone::CloneRequest {
                user,
                dir,
                protocol,
                concurrency,
                dry_run,
                list_options: ListOptions {
                    no_forks,
                    no_archived,
                    filter,
                },
            },
        ),
        Commands::Pull {
            user,
            dir,
            concurrency,
            stash,
            rebase,
            owned_only,
            owner,
        } => commands::pull::run(
            ctx,
            commands::pull::PullRequest {
                user,
                dir,
                concurrency,
                options: PullOptions { stash, rebase },
                owned_only,
                owner,
            },
        ),
        Commands::Fetch {
            user,
            dir,
            concurrency,
        } => commands::fetch::run(ctx, user.as_deref(), dir.as_deref(), concurrency),
        Commands::Status {
            user,
            dir,
            concurrency,
            all,
        } => commands::status::run(ctx, user.as_deref(), dir.as_deref(), concurrency, all),
        Commands::List {
            user,
            dir,
            concurrency,
        } => commands::list::run(ctx, user.as_deref(), dir.as_deref(), concurrency),
        Commands::Config { command } => match command {
            ConfigCommands::Init { username } => commands::config::init(ctx, &username),
            ConfigCommands::Show => commands::config::show(ctx),
            ConfigCommands::Path => commands::config::path(ctx),
            ConfigCommands::AddAccount {
                username,
                dir,
                protocol,
                token,
            } => commands::config::add_account(ctx, &username, &dir, protocol, token),
            ConfigCommands::RemoveAccount { username } => {
                commands::config::remove_account(ctx, &username)
            }
            ConfigCommands::Discover { dir, dry_run } => {
                commands::config::discover(ctx, &dir, dry_run)
            }
        },
    }
}
