// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! mkrepo - create a private GitHub repository from the command line.
//!
//! This is the binary entry point. The GitHub token is kept encrypted at
//! rest under a key derived from this machine's hardware identity.

mod create;
mod runner;
mod token;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use mkrepo_config::MkrepoConfig;
use mkrepo_core::MkrepoError;
use mkrepo_vault::{
    console_prompt, CredentialAcquirer, CredentialStore, MachineIdentityResolver, TokenFormat,
};

use crate::create::{CreateContext, CreateOptions};
use crate::runner::SystemRunner;

/// mkrepo - create a private GitHub repository from the command line.
#[derive(Parser, Debug)]
#[command(name = "mkrepo", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a local repository, commit it, and push it to a new private GitHub repository.
    Create {
        /// Repository name.
        name: String,
        /// Local directory (defaults to ./<NAME>).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Repository description.
        #[arg(short, long)]
        description: Option<String>,
        /// Only prepare the local repository.
        #[arg(long)]
        no_push: bool,
    },
    /// Manage the stored GitHub token.
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Show where the token lives and whether it can be decrypted here.
    Status,
    /// Prompt for a new token and store it.
    Set,
    /// Delete the stored token.
    Clear,
}

fn main() {
    let cli = Cli::parse();

    let config = match mkrepo_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            mkrepo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&effective_level(&config.log.level, cli.verbose));

    if let Err(err) = run(cli.command, &config) {
        let label = if err.is_fatal() { "fatal:" } else { "error:" };
        eprintln!("{} {err}", label.red().bold());
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &MkrepoConfig) -> Result<(), MkrepoError> {
    let credential = &config.credential;
    let path = credential.token_path().ok_or_else(|| {
        MkrepoError::Config("cannot determine the home directory for the token file".to_string())
    })?;
    let store = CredentialStore::new(path, MachineIdentityResolver::platform_default());
    let acquirer = CredentialAcquirer::new(&store, TokenFormat::new(&credential.token_prefix))
        .max_attempts(credential.max_attempts)
        .env_override(credential.env_var.as_str());

    match command {
        Commands::Create {
            name,
            path,
            description,
            no_push,
        } => {
            let opts = CreateOptions {
                name,
                path,
                description,
                push: !no_push,
            };
            let cwd = std::env::current_dir()
                .map_err(|e| MkrepoError::io("reading current directory", e))?;
            let mut prompt = console_prompt(credential.mask_input);
            create::run_create(
                &opts,
                &cwd,
                CreateContext {
                    repo: &config.repo,
                    runner: &SystemRunner,
                    store: &store,
                    acquirer: &acquirer,
                    prompt: prompt.as_mut(),
                },
            )?;
            Ok(())
        }
        Commands::Token { action } => match action {
            TokenCommand::Status => token::run_status(&store),
            TokenCommand::Set => {
                let mut prompt = console_prompt(credential.mask_input);
                token::run_set(&acquirer, prompt.as_mut())
            }
            TokenCommand::Clear => token::run_clear(&store),
        },
    }
}

/// Normalized filter level. `-v` flags raise the configured level, never lower it.
fn effective_level(configured: &str, verbose: u8) -> String {
    let configured = configured.trim().to_ascii_lowercase();
    match verbose {
        0 => configured,
        1 if matches!(configured.as_str(), "trace" | "debug") => configured,
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Logs go to stderr so they never mix with prompts on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mkrepo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
