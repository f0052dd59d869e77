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
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    RegexError(Box<fancy_regex::Error>),

    #[error(
        "Missing project root. Please provide one via --root, the MIGRATE_ROOT environment variable, or in your config file."
    )]
    MissingRoot,

    #[error("Project root '{}' does not exist or is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("Invalid file argument: {0}")]
    InvalidFileArgument(String),

    #[error("Error: {0}")]
    Other(String),
}
