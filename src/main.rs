mod cli;
mod config;
mod error;
mod init;
mod rewrite;
mod utils;

use cli::*;
use config::Config;
use error::MigrateError;
use rewrite::match_args;

fn main() -> Result<(), MigrateError> {
    let args = parse_args();

    let config = if let Some(config_path) = &args.file {
        Config::from_file(config_path)?
    } else {
        Config::load()
    };

    match_args::match_arguments(&args, config)?;

    Ok(())
}
