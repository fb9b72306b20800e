//! PadVault CLI - zero-knowledge encrypted pads addressed by a secret code.
//!
//! This binary is the client side of the trust boundary: codes are
//! prompted for and hashed locally, keys are derived locally, and only
//! ciphertext and code hashes ever reach the pad store.

mod app;
mod cli;
mod commands;
mod helpers;

use clap::Parser;

use cli::{Cli, Commands, HistoryCommands};

fn main() {
    let cli = Cli::parse();
    let ctx = app::AppContext::new(cli.store);

    let result = match cli.command {
        Commands::Init => commands::init::handle_init(&ctx),
        Commands::Create { text, locked } => commands::create::handle_create(&ctx, text, locked),
        Commands::Open { meta } => commands::open::handle_open(&ctx, meta),
        Commands::Save { text } => commands::save::handle_save(&ctx, text),
        Commands::Settings { at, clear } => commands::settings::handle_settings(&ctx, at, clear),
        Commands::History { command } => match command {
            HistoryCommands::List => commands::history::handle_list(&ctx),
            HistoryCommands::Restore { revision_id } => {
                commands::history::handle_restore(&ctx, revision_id)
            }
            HistoryCommands::Clear { yes } => commands::history::handle_clear(&ctx, yes),
        },
        Commands::Sweep { secret } => commands::sweep::handle_sweep(&ctx, secret),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
