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
use crate::config::Config;
use crate::error::MigrateError;
use crate::utils::filter::get_or_compile;
use fancy_regex::Regex;
use std::fmt;

/// Any file read through localStorage is a candidate for the auth pass,
/// whatever key it uses
const STORAGE_READ_PRECHECK: &str = "localStorage.getItem";

/// The rewrite passes, in the order they run. Later passes see the output
/// of earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Imports,
    Urls,
    Auth,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Imports => "imports",
            Pass::Urls => "urls",
            Pass::Auth => "auth",
        };
        write!(f, "{name}")
    }
}

/// Build the pass list from the skip flags, keeping the fixed order
pub fn enabled_passes(no_imports: bool, no_urls: bool, no_auth: bool) -> Vec<Pass> {
    let mut passes = Vec::new();
    if !no_imports {
        passes.push(Pass::Imports);
    }
    if !no_urls {
        passes.push(Pass::Urls);
    }
    if !no_auth {
        passes.push(Pass::Auth);
    }
    passes
}

/// Everything the passes need to know, compiled once per run from the
/// config file and defaults
pub struct RewriteRules {
    pub module: String,
    pub url_helper: String,
    pub token_helper: String,
    pub api_base: String,
    pub storage_key: String,
    pub error_message: String,
    /// Matches '<api_base>/api/<path>' wrapped in matching quotes
    pub(crate) url_regex: Regex,
    /// The exact statement the auth matcher anchors on
    pub(crate) storage_anchor: String,
}

impl RewriteRules {
    /// Compile the rule set from configuration
    pub fn from_config(config: &Config) -> Result<Self, MigrateError> {
        let module = config.get_module();
        let url_helper = config.get_url_helper();
        let token_helper = config.get_token_helper();
        let api_base = config.get_api_base();
        let storage_key = config.get_storage_key();
        let error_message = config.get_error_message();

        for (value, what) in [
            (&module, "helpers.module"),
            (&url_helper, "helpers.url_helper"),
            (&token_helper, "helpers.token_helper"),
            (&api_base, "patterns.api_base"),
            (&storage_key, "patterns.storage_key"),
        ] {
            if value.trim().is_empty() {
                return Err(MigrateError::Other(format!(
                    "Config value '{what}' must not be empty"
                )));
            }
        }

        // The backreference keeps the closing quote tied to the opening one,
        // so template literals stay template literals
        let pattern = format!(r#"(['"`]){}/api/([^'"`]+)\1"#, regex::escape(&api_base));
        let url_regex = get_or_compile(&pattern)?;
        let storage_anchor =
            format!("const authData = localStorage.getItem('{storage_key}')");

        Ok(RewriteRules {
            module,
            url_helper,
            token_helper,
            api_base,
            storage_key,
            error_message,
            url_regex,
            storage_anchor,
        })
    }

    /// Cheap precheck so files without either pattern are never parsed
    pub fn is_candidate(&self, text: &str) -> bool {
        text.contains(&self.api_base) || text.contains(STORAGE_READ_PRECHECK)
    }
}

/// Applies the enabled passes to file contents
pub struct Rewriter {
    pub(crate) rules: RewriteRules,
    passes: Vec<Pass>,
}

impl Rewriter {
    pub fn new(rules: RewriteRules, passes: Vec<Pass>) -> Self {
        Rewriter { rules, passes }
    }

    /// Apply the enabled passes in order. Returns the rewritten text and
    /// the passes that matched anything.
    pub fn rewrite_text(&self, text: &str) -> (String, Vec<Pass>) {
        let mut current = text.to_string();
        let mut matched = Vec::new();
        for pass in &self.passes {
            let result = match pass {
                Pass::Imports => self.inject_import(&current),
                Pass::Urls => self.replace_urls(&current),
                Pass::Auth => self.replace_auth(&current),
            };
            if let Some(new_text) = result {
                current = new_text;
                matched.push(*pass);
            }
        }
        (current, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> Rewriter {
        let rules = RewriteRules::from_config(&Config::default()).unwrap();
        Rewriter::new(rules, enabled_passes(false, false, false))
    }

    #[test]
    fn test_enabled_passes_keep_order() {
        assert_eq!(
            enabled_passes(false, false, false),
            vec![Pass::Imports, Pass::Urls, Pass::Auth]
        );
        assert_eq!(enabled_passes(true, false, true), vec![Pass::Urls]);
        assert!(enabled_passes(true, true, true).is_empty());
    }

    #[test]
    fn test_from_config_rejects_empty_values() {
        let config: Config = toml::from_str(
            r#"
            [helpers]
            url_helper = " "
            "#,
        )
        .unwrap();
        assert!(RewriteRules::from_config(&config).is_err());
    }

    #[test]
    fn test_is_candidate() {
        let rules = RewriteRules::from_config(&Config::default()).unwrap();
        assert!(rules.is_candidate("fetch('http://127.0.0.1:8090/api/x')"));
        assert!(rules.is_candidate("const raw = localStorage.getItem('session')"));
        assert!(!rules.is_candidate("export const x = 1"));
    }

    #[test]
    fn test_full_pipeline() {
        let input = "\
import { pb } from '@/lib/pocketbase'

export async function loadStudents() {
  const url = 'http://127.0.0.1:8090/api/collections/students/records'
  return fetch(url)
}
";
        let expected = "\
import { pb } from '@/lib/pocketbase'
import { getApiUrl, getAuthToken } from '@/lib/pocketbase'

export async function loadStudents() {
  const url = getApiUrl('collections/students/records')
  return fetch(url)
}
";
        let (output, matched) = rewriter().rewrite_text(input);
        assert_eq!(output, expected);
        assert_eq!(matched, vec![Pass::Imports, Pass::Urls]);
    }

    #[test]
    fn test_one_import_line_for_many_replacements() {
        let input = "\
const a = 'http://127.0.0.1:8090/api/one'
const b = 'http://127.0.0.1:8090/api/two'
const c = 'http://127.0.0.1:8090/api/three'
";
        let (output, _) = rewriter().rewrite_text(input);
        assert_eq!(output.matches("import {").count(), 1);
        assert_eq!(output.matches("getApiUrl(").count(), 3);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let input = "\
import { pb } from '@/lib/pocketbase'

export function useInfo() {
      const authData = localStorage.getItem('pocketbase_auth')
      if (!authData) throw new Error('Non authentifié')
      const { token } = JSON.parse(authData)
      const res = fetch('http://127.0.0.1:8090/api/info', { headers: { Authorization: token } })
      return res
}
";
        let rewriter = rewriter();
        let (once, matched) = rewriter.rewrite_text(input);
        assert_eq!(matched, vec![Pass::Imports, Pass::Urls, Pass::Auth]);

        let (twice, matched_again) = rewriter.rewrite_text(&once);
        assert_eq!(twice, once);
        assert!(matched_again.is_empty());
    }

    #[test]
    fn test_disabled_pass_leaves_pattern_untouched() {
        let rules = RewriteRules::from_config(&Config::default()).unwrap();
        let rewriter = Rewriter::new(rules, enabled_passes(true, false, true));

        let input = "const url = 'http://127.0.0.1:8090/api/ping'\n";
        let (output, matched) = rewriter.rewrite_text(input);
        assert_eq!(output, "const url = getApiUrl('ping')\n");
        assert_eq!(matched, vec![Pass::Urls]);
        assert!(!output.contains("import"));
    }
}
