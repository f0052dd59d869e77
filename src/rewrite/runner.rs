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
use crate::error::MigrateError;
use crate::rewrite::engine::{Pass, Rewriter};
use crate::utils::file_utils::{backup_file, relative_display};
use crate::utils::tables::Table;
use console::user_attended;
use std::fs;
use std::path::Path;

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Rewritten on disk; holds the passes that matched
    Modified(Vec<Pass>),
    /// Dry run; the file would have been rewritten
    WouldModify(Vec<Pass>),
    Unchanged,
    NotFound,
}

/// Counters for the run, one line each in the summary table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub modified: usize,
    pub unchanged: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.modified + self.unchanged + self.not_found + self.failed
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
    pub dry_run: bool,
    pub backup: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl Rewriter {
    /// Run the enabled passes over one file and write the result back,
    /// honoring dry run and backup options. Files without either pattern
    /// are reported unchanged without being parsed.
    pub fn rewrite_file(
        &self,
        path: &Path,
        options: RunOptions,
    ) -> Result<FileOutcome, MigrateError> {
        if !path.is_file() {
            return Ok(FileOutcome::NotFound);
        }
        let text = fs::read_to_string(path)?;
        if !self.rules.is_candidate(&text) {
            return Ok(FileOutcome::Unchanged);
        }
        let (rewritten, matched) = self.rewrite_text(&text);
        if rewritten == text {
            return Ok(FileOutcome::Unchanged);
        }
        if options.dry_run {
            return Ok(FileOutcome::WouldModify(matched));
        }
        if options.backup {
            backup_file(path)?;
        }
        fs::write(path, rewritten)?;
        Ok(FileOutcome::Modified(matched))
    }

    /// Rewrite every file in the list, printing a status line per file.
    /// A file that fails is reported and skipped, never aborts the run.
    pub fn process_all(&self, root: &Path, files: &[impl AsRef<Path>], options: RunOptions) -> RunSummary {
        let mut summary = RunSummary::default();
        for file in files {
            let path = file.as_ref();
            let display = relative_display(root, path);
            match self.rewrite_file(path, options) {
                Ok(FileOutcome::Modified(passes)) => {
                    summary.modified += 1;
                    if !options.quiet {
                        if options.verbose {
                            println!("✅ Modified {display} ({})", join_passes(&passes));
                        } else {
                            println!("✅ Modified {display}");
                        }
                    }
                }
                Ok(FileOutcome::WouldModify(passes)) => {
                    summary.modified += 1;
                    if !options.quiet {
                        if options.verbose {
                            println!("ℹ️ Would modify {display} ({})", join_passes(&passes));
                        } else {
                            println!("ℹ️ Would modify {display}");
                        }
                    }
                }
                Ok(FileOutcome::Unchanged) => {
                    summary.unchanged += 1;
                    if options.verbose && !options.quiet {
                        println!("No changes for {display}");
                    }
                }
                Ok(FileOutcome::NotFound) => {
                    summary.not_found += 1;
                    eprintln!("❌ File not found: {display}");
                }
                Err(e) => {
                    summary.failed += 1;
                    eprintln!("❌ Skipping {display}: {e}");
                }
            }
        }
        summary
    }
}

fn join_passes(passes: &[Pass]) -> String {
    passes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print the closing count and, on a terminal, the summary table
pub fn print_summary(summary: &RunSummary, options: RunOptions) {
    let modified_label = if options.dry_run {
        "would modify"
    } else {
        "modified"
    };
    if options.dry_run {
        println!(
            "{} of {} file(s) would be modified",
            summary.modified,
            summary.processed()
        );
    } else {
        println!(
            "{} of {} file(s) modified",
            summary.modified,
            summary.processed()
        );
    }
    if options.quiet || !user_attended() {
        return;
    }
    let rows = vec![
        vec![modified_label.to_string(), summary.modified.to_string()],
        vec!["unchanged".to_string(), summary.unchanged.to_string()],
        vec!["not found".to_string(), summary.not_found.to_string()],
        vec!["failed".to_string(), summary.failed.to_string()],
    ];
    let table = Table::default()
        .title("Run summary")
        .header(["Status", "Files"])
        .rows(rows);
    println!("{table}");
}
