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
use crate::config::CONFIG_NAME;
use crate::error::MigrateError;
use microxdg::Xdg;
use std::fs;
use std::path::PathBuf;
/// A basic sample configuration that can be initialized
/// by using the `config` command
const SAMPLE_CONFIG: &str = r#"#Source rewrite configuration
[project]
# Absolute path to the project that should be rewritten.
# --root and $MIGRATE_ROOT take priority over this value.
#root = "/home/user/projects/school-portal"
# Files to process, relative to the project root. When no list is
# configured (and --files is not passed), the whole tree is walked.
#files = [
#    "hooks/use-students.ts",
#    "app/admin/page.tsx",
#]

[discovery]
# File extensions that count as source files during a walk
extensions = ["ts", "tsx", "jsx"]
# A file or directory is skipped when any component of its path
# contains one of these substrings
exclude = ["node_modules", ".next"]

# The central module the rewritten code should go through.
# Injected imports look like:
#   import { getApiUrl, getAuthToken } from '@/lib/pocketbase'
[helpers]
module = "@/lib/pocketbase"
url_helper = "getApiUrl"
token_helper = "getAuthToken"

[patterns]
# Url prefix whose '<api_base>/api/<path>' string literals get folded
# into url_helper calls
api_base = "http://127.0.0.1:8090"
# localStorage key that holds the serialized auth state
storage_key = "pocketbase_auth"
# Message thrown by the guard statement when no auth state is stored
error_message = "Non authentifié"
"#;

/// Create a sample config file
pub fn generate_config(path: Option<&PathBuf>, force: bool) -> Result<PathBuf, MigrateError> {
    // This is only needed if a path isn't provided
    let xdg = Xdg::new();
    let config_path = if let Ok(xdg) = xdg {
        let f = xdg.config_file(CONFIG_NAME);
        f.ok()
    } else {
        None
    };

    match (path, force, config_path) {
        (Some(path), true, _) => {
            if path.exists() {
                let mut backup = path.clone().into_os_string();
                backup.push(".bak");
                fs::copy(path, backup)?;
            }
            fs::write(path, SAMPLE_CONFIG)?;
            Ok(path.clone())
        }
        (Some(path), false, _) => {
            if path.exists() {
                return Err(MigrateError::Other(format!(
                    "Config file already exists at {}. Use --force to overwrite",
                    path.display()
                )));
            }
            fs::write(path, SAMPLE_CONFIG)?;
            Ok(path.clone())
        }
        (None, true, Some(config_path)) => {
            if config_path.exists() {
                let mut backup = config_path.clone().into_os_string();
                backup.push(".bak");
                fs::copy(&config_path, backup)?;
            }
            fs::write(&config_path, SAMPLE_CONFIG)?;
            Ok(config_path)
        }
        (None, false, Some(config_path)) => {
            if config_path.exists() {
                return Err(MigrateError::Other(format!(
                    "Config file already exists at {}. Use --force to overwrite",
                    config_path.display()
                )));
            }
            fs::write(&config_path, SAMPLE_CONFIG)?;
            Ok(config_path)
        }
        (None, _, None) => {
            panic!(
                "No config file specified and $XDG_CONFIG_HOME or $HOME/.config could not be determined. Cannot continue"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_generate_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_NAME);

        let written = generate_config(Some(&path), false).unwrap();
        assert_eq!(written, path);

        // The sample must parse back into a usable config
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.get_module(), "@/lib/pocketbase");
        assert_eq!(config.get_extensions(), vec!["ts", "tsx", "jsx"]);
        assert_eq!(config.get_error_message(), "Non authentifié");
    }

    #[test]
    fn test_generate_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_NAME);

        generate_config(Some(&path), false).unwrap();
        assert!(generate_config(Some(&path), false).is_err());
    }

    #[test]
    fn test_generate_config_force_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_NAME);

        fs::write(&path, "#old config").unwrap();
        generate_config(Some(&path), true).unwrap();

        let backup = dir.path().join(format!("{CONFIG_NAME}.bak"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "#old config");
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_CONFIG);
    }
}
