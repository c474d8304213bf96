//! # backup-list
//! Prints backups read from stdin, one `<file name>[\t<date>]` per line.
//!

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use backup_display::init_logger;
use backup_list::{Config, Context, LoadConfigError, Listing, read_entries};
use mimalloc::MiMalloc;
use tracing::{error, info};

fn main() -> ExitCode {
    // Initialize config if args include 'init'.
    if std::env::args().any(|arg| arg.eq("init")) {
        let contents = match toml::to_string_pretty(&Config::default()) {
            Ok(contents) => contents,
            Err(error) => {
                eprintln!("Could not serialize config: {error}");
                return ExitCode::FAILURE;
            }
        };

        if let Err(error) = fs::write("config.toml", contents) {
            eprintln!("Could not write config.toml: {error}");
            return ExitCode::FAILURE;
        }

        return ExitCode::SUCCESS;
    }

    let json = std::env::args().any(|arg| arg.eq("json"));

    // Load config
    let (config, found_config) = match Config::load_toml(PathBuf::from("./config.toml")) {
        Ok(config) => (config, true),
        Err(LoadConfigError::NoFile) => (Config::default(), false),
        Err(error) => {
            eprintln!("Could not load config: {error}");
            return ExitCode::FAILURE;
        }
    };

    let _logger = match init_logger(&config.logging) {
        Ok(guards) => guards,
        Err(error) => {
            eprintln!("Could not initialize logger: {error}");
            return ExitCode::FAILURE;
        }
    };

    if !found_config {
        info!("No config.toml found, using the default config");
    }

    let mut context = Context::default();

    // Read backups
    let entries = match read_entries(&mut context, io::stdin().lock()) {
        Ok(entries) => entries,
        Err(error) => {
            error!("{context}Could not read backups: {error}");
            return ExitCode::FAILURE;
        }
    };

    // Render listing
    context.current_context = "Render";
    let listing = Listing::new(&entries, &config.date);
    let output = if json {
        match listing.render_json() {
            Ok(output) => output,
            Err(error) => {
                error!("{context}Could not serialize listing: {error}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        listing.render_text()
    };

    if let Err(error) = writeln!(io::stdout().lock(), "{output}") {
        error!("{context}Could not write listing: {error}");
        return ExitCode::FAILURE;
    }

    info!(
        "{context}Listed {} backups, {} complete",
        listing.rows.len(),
        listing.complete_count()
    );

    ExitCode::SUCCESS
}
