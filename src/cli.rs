/*
Licensed to the Apache Software Foundation (ASF) under one
or more contributor license agreements.  See the NOTICE file
distributed with this work for additional information
regarding copyright ownership.  The ASF licenses this file
to you under the Apache License, Version 2.0 (the
"License"); you may not use this file except in compliance
with the License.  You may obtain a copy of the License at

  http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing,
software distributed under the License is distributed on an
"AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
KIND, either express or implied.  See the License for the
specific language governing permissions and limitations
under the License.
*/
use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// `api_migrate` rewrites the source files of a web project so that
/// hardcoded backend urls and localStorage auth access go through the
/// project's central helper functions instead.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppArgs {
    /// Path to config file
    #[arg(short, long, global = true, env = "CONFIG_FILE")]
    pub file: Option<PathBuf>,

    /// The command that will get run
    #[command(subcommand)]
    pub command: Command,

    /// Make output quiet. This is useful when not running in interactive mode
    #[arg(short, long, default_value_t = false, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(long, default_value_t = false, global = true)]
    pub verbose: bool,

    /// Report what would change without writing anything back
    #[arg(short, long, default_value_t = false, global = true)]
    pub dry_run: bool,
}

/// Options for the 'run' command
#[derive(Args, Clone, Debug)]
#[command(
    group(
        ArgGroup::new("target")
        .args(&["all", "files"])
    ),
    after_help = "\
EXAMPLES:
    # Rewrite the files listed in the config, or the whole tree when none are listed
    api_migrate run --root ~/projects/school-portal
    # Rewrite two specific files, keeping .bak copies of the originals
    api_migrate run --root ~/projects/school-portal --files hooks/use-students.ts app/admin/page.tsx --backup
    # See which files a full walk would touch, without writing anything
    api_migrate run --root ~/projects/school-portal --all --dry-run

NOTES:
    - File arguments are relative to the project root.
    - Use --all to walk the project even when the config lists files. You cannot use both at the same time.
        "
)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunCommand {
    /// The root directory of the project to rewrite
    #[arg(short, long, env = "MIGRATE_ROOT")]
    pub root: Option<PathBuf>,

    /// Files to rewrite, relative to the project root. Overrides the file
    /// list from the config. If --all is specified, this is not a valid option.
    #[arg(short = 'F', long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Walk the whole project for candidate files, even when the config lists
    /// specific files. If --files is specified, this is not a valid option.
    #[arg(short, long, default_value_t = false)]
    pub all: bool,

    /// Write a .bak copy of every file before modifying it
    #[arg(short, long, default_value_t = false)]
    pub backup: bool,

    /// Skip the helper import injection pass
    #[arg(long, default_value_t = false)]
    pub no_imports: bool,

    /// Skip the url literal replacement pass
    #[arg(long, default_value_t = false)]
    pub no_urls: bool,

    /// Skip the auth pattern replacement pass
    #[arg(long, default_value_t = false)]
    pub no_auth: bool,
}

impl RunCommand {
    /// Validate the file arguments. They get joined onto the project root,
    /// so empty or absolute entries can't work, and clap has no way to
    /// enforce that through the type system or macros.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(files) = &self.files {
            for file in files {
                if file.trim().is_empty() {
                    return Err("File arguments must not be empty".to_string());
                }
                if Path::new(file).is_absolute() {
                    return Err(format!(
                        "File argument '{file}' must be relative to the project root"
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Apply the rewrite passes to the project
    Run(RunCommand),

    /// Generate a default config
    Config {
        /// Path to save the config file.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Overwrite existing config file if it exists
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Generate completions or a manpage. This command is hidden by default since it should really
    /// done at build time
    #[command(hide = true)]
    Generate {
        /// What to generate. Can be shell completion for bash, zsh, or fish; or manpages.
        #[arg(long, value_parser = ["bash", "zsh", "fish", "man"])]
        kind: String,
        /// An optional output path. If not specified, the current directory will be used instead
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

/// Parse the command line arguments and validate them.
/// This function uses clap to generate the `AppArgs` struct,
/// and then runs a small amount of validation on it that can't be
/// enforced by the type system or macros.
pub fn parse_args() -> AppArgs {
    let app = AppArgs::try_parse();
    let app = match app {
        Ok(app) => app,
        Err(err) => {
            err.print().unwrap();
            std::process::exit(1);
        }
    };
    if let Command::Run(run) = &app.command {
        if let Err(e) = run.validate() {
            eprintln!("Error validating run command: {e}");

            std::process::exit(1);
        }
    }
    app
}

pub fn cli() -> clap::Command {
    AppArgs::command()
}
