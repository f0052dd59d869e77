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
use crate::cli::*;
use crate::config::Config;
use crate::error::MigrateError;
use crate::init::generate_config;
use crate::rewrite::engine::{RewriteRules, Rewriter, enabled_passes};
use crate::rewrite::runner::{RunOptions, print_summary};
use crate::utils::file_utils::discover_files;
use clap_complete::{
    generate_to,
    shells::{Bash, Fish, Zsh},
};
use clap_mangen::Man;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Parse the argument that gets passed, and run their associated methods
pub fn match_arguments(app: &AppArgs, config: Config) -> Result<(), MigrateError> {
    match &app.command {
        Command::Run(run_cmd) => {
            run_cmd.validate().map_err(MigrateError::InvalidFileArgument)?;
            let root = run_cmd
                .root
                .clone()
                .or_else(|| config.get_root())
                .ok_or(MigrateError::MissingRoot)?;
            if !root.is_dir() {
                return Err(MigrateError::InvalidRoot(root));
            }

            let rules = RewriteRules::from_config(&config)?;
            let passes = enabled_passes(run_cmd.no_imports, run_cmd.no_urls, run_cmd.no_auth);
            if passes.is_empty() {
                return Err(MigrateError::Other(
                    "All rewrite passes are disabled".to_string(),
                ));
            }

            let files = resolve_files(run_cmd, &config, &root);
            if files.is_empty() {
                if !app.quiet {
                    println!("No candidate files found under {}", root.display());
                }
                return Ok(());
            }

            let options = RunOptions {
                dry_run: app.dry_run,
                backup: run_cmd.backup,
                quiet: app.quiet,
                verbose: app.verbose,
            };
            let rewriter = Rewriter::new(rules, passes);
            let summary = rewriter.process_all(&root, &files, options);
            print_summary(&summary, options);
        }
        Command::Config { file, force } => {
            let path = generate_config(file.as_ref(), *force)?;
            if !app.quiet {
                println!("✅ Config file created at {}", path.display());
            }
        }
        Command::Generate { kind, out } => {
            let mut cmd = cli();

            let out_dir = out
                .clone()
                .unwrap_or_else(|| std::env::current_dir().unwrap());
            match kind.as_str() {
                "bash" => {
                    generate_to(Bash, &mut cmd, "api_migrate", out_dir)?;
                    println!("Generated bash completions");
                }
                "zsh" => {
                    generate_to(Zsh, &mut cmd, "api_migrate", out_dir)?;
                    println!("Generated zsh completions");
                }
                "fish" => {
                    generate_to(Fish, &mut cmd, "api_migrate", out_dir)?;
                    println!("Generated fish completions");
                }
                "man" => {
                    let out_dir = out
                        .clone()
                        .unwrap_or_else(|| std::env::current_dir().unwrap());
                    let cmd = cli();
                    generate_manpages(cmd, &out_dir, None);
                    println!("Manpages generated");
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Decide which files the run touches. Explicit file arguments win over the
/// config's list; --all and an empty config both mean walking the tree.
fn resolve_files(run_cmd: &RunCommand, config: &Config, root: &Path) -> Vec<PathBuf> {
    let listed = if run_cmd.all {
        None
    } else {
        run_cmd
            .files
            .clone()
            .or_else(|| config.project.files.clone())
    };
    match listed {
        Some(files) => files.iter().map(|file| root.join(file)).collect(),
        None => discover_files(root, &config.get_extensions(), &config.get_exclude()),
    }
}

/// Helper to write manpages
fn write_man(cmd: &mut clap::Command, out_dir: &Path, name: &str) {
    let man = Man::new(cmd.clone());
    let mut file = File::create(out_dir.join(name)).unwrap();
    man.render(&mut file).unwrap();
}

/// Generate manpages for all subcommands. Otherwise we only get a manpage for the root command.
fn generate_manpages(mut cmd: clap::Command, out_dir: &PathBuf, parent: Option<String>) {
    let name = if let Some(parent) = parent {
        format!("api_migrate-{parent}.1")
    } else {
        "api_migrate.1".to_string()
    };
    write_man(&mut cmd, out_dir, &name);

    for subcommand in cmd.get_subcommands() {
        if subcommand.is_hide_set() {
            continue;
        }
        let sub_name = subcommand.get_name().to_string().replace('_', "-");
        generate_manpages(subcommand.clone(), out_dir, Some(sub_name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn run_command() -> RunCommand {
        RunCommand {
            root: None,
            files: None,
            all: false,
            backup: false,
            no_imports: false,
            no_urls: false,
            no_auth: false,
        }
    }

    #[test]
    fn test_resolve_files_prefers_arguments() {
        let config: Config = toml::from_str(
            r#"
            [project]
            files = ["from-config.ts"]
            "#,
        )
        .unwrap();
        let mut run_cmd = run_command();
        run_cmd.files = Some(vec!["from-args.ts".to_string()]);

        let files = resolve_files(&run_cmd, &config, Path::new("/project"));
        assert_eq!(files, vec![PathBuf::from("/project/from-args.ts")]);
    }

    #[test]
    fn test_resolve_files_falls_back_to_config() {
        let config: Config = toml::from_str(
            r#"
            [project]
            files = ["hooks/use-students.ts"]
            "#,
        )
        .unwrap();
        let files = resolve_files(&run_command(), &config, Path::new("/project"));
        assert_eq!(files, vec![PathBuf::from("/project/hooks/use-students.ts")]);
    }

    #[test]
    fn test_resolve_files_all_overrides_config_list() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.ts"), "export const a = 1\n").unwrap();
        fs::write(root.join("b.tsx"), "export const b = 2\n").unwrap();

        let config: Config = toml::from_str(
            r#"
            [project]
            files = ["a.ts"]
            "#,
        )
        .unwrap();
        let mut run_cmd = run_command();
        run_cmd.all = true;

        let files = resolve_files(&run_cmd, &config, root);
        assert_eq!(files, vec![root.join("a.ts"), root.join("b.tsx")]);
    }

    #[test]
    fn test_resolve_files_walks_without_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("only.ts"), "export const a = 1\n").unwrap();

        let files = resolve_files(&run_command(), &Config::default(), root);
        assert_eq!(files, vec![root.join("only.ts")]);
    }
}
