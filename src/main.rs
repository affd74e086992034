use clap::Parser;
use color_eyre::Result;
use daybook::auth::require_session;
use daybook::cli::{self, Cli, Commands, Context};
use daybook::{Config, Database, Profile, SessionFile, utils};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev selects separate config and database locations
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(&utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let db_path = match cli.db.as_deref() {
        Some(path) => utils::expand_path(path),
        None => config.get_database_path(),
    };

    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file next to the database
    let log_file = (command == Commands::Tui).then(|| db_path.with_file_name("daybook.log"));
    cli::init_tracing(cli.verbose, cli.quiet, config.log_level.as_deref(), log_file.as_deref())?;

    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    let auth = SessionFile::beside(&db_path);
    let zone = config.zone()?;

    match command {
        Commands::Tui => {
            let session = require_session(&auth)?;
            daybook::tui::run(config, db, session, zone)?;
        }
        command => {
            let ctx = Context { db, auth, config, zone };
            cli::dispatch(&ctx, command)?;
        }
    }

    Ok(())
}
