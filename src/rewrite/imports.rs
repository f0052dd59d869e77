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
use crate::rewrite::engine::Rewriter;
use crate::utils::filter::get_or_compile;
use std::collections::HashSet;

/// Multi-line import statements longer than this are abandoned rather
/// than accumulated forever
const MAX_IMPORT_LINES: usize = 16;

/// One import statement recognized in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportStatement {
    /// Module specifier as written, quotes stripped
    pub module: String,
    /// Local names bound by this import
    pub names: Vec<String>,
    /// Byte offset just past the statement's final line
    pub end: usize,
    /// Leading whitespace of the first line
    pub indent: String,
    /// Quote character around the module specifier
    pub quote: char,
}

enum ParsedImport {
    Complete {
        module: String,
        names: Vec<String>,
        quote: char,
    },
    /// Looks like an import but the specifier hasn't appeared yet
    Incomplete,
    Invalid,
}

struct PendingImport {
    indent: String,
    statement: String,
    lines: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn leading_quote(s: &str) -> Option<char> {
    match s.chars().next() {
        Some(c @ ('\'' | '"' | '`')) => Some(c),
        _ => None,
    }
}

/// Content between the leading quote of `s` and its closing twin
fn read_quoted(s: &str, quote: char) -> Option<String> {
    let inner = &s[quote.len_utf8()..];
    let end = inner.find(quote)?;
    Some(inner[..end].to_string())
}

/// Split an import clause from its specifier at the first `from` keyword
/// outside braces
fn split_at_from(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    for i in 0..bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'f' if depth == 0 && s[i..].starts_with("from") => {
                let before_ok = i == 0 || !is_ident_char(bytes[i - 1] as char);
                let after_ok = s[i + 4..]
                    .chars()
                    .next()
                    .is_none_or(|c| !is_ident_char(c));
                if before_ok && after_ok {
                    return Some((&s[..i], &s[i + 4..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a clause at commas that sit outside braces
fn split_top_level(clause: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let bytes = clause.as_bytes();
    let mut depth = 0usize;
    let mut last = 0;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&clause[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&clause[last..]);
    parts
}

/// Collect the local names an import clause binds: default imports,
/// `* as ns`, and brace lists with `as` renames
fn parse_clause(clause: &str) -> Vec<String> {
    let mut names = Vec::new();
    for segment in split_top_level(clause) {
        let segment = segment.trim();
        let segment = segment
            .strip_prefix("type ")
            .map(str::trim)
            .unwrap_or(segment);
        if segment.is_empty() {
            continue;
        }
        if let Some(inner) = segment.strip_prefix('{') {
            let inner = inner.strip_suffix('}').unwrap_or(inner);
            for item in inner.split(',') {
                let item = item.trim();
                let item = item.strip_prefix("type ").map(str::trim).unwrap_or(item);
                if item.is_empty() {
                    continue;
                }
                match item.split_whitespace().collect::<Vec<_>>()[..] {
                    [name] => names.push(name.to_string()),
                    [_, "as", local] => names.push(local.to_string()),
                    _ => {}
                }
            }
        } else if let Some(rest) = segment.strip_prefix('*') {
            let mut parts = rest.split_whitespace();
            if parts.next() == Some("as") {
                if let Some(ns) = parts.next() {
                    names.push(ns.to_string());
                }
            }
        } else if let Some(name) = segment.split_whitespace().next() {
            names.push(name.to_string());
        }
    }
    names
}

fn parse_import_statement(statement: &str) -> ParsedImport {
    let trimmed = statement.trim_start();
    let Some(after) = trimmed.strip_prefix("import") else {
        return ParsedImport::Invalid;
    };
    // Reject identifiers that merely start with the keyword, like `imports`
    match after.chars().next() {
        Some(c) if is_ident_char(c) => return ParsedImport::Invalid,
        None => return ParsedImport::Incomplete,
        _ => {}
    }
    let after = after.trim_start();

    // Side effect import: import './globals.css'
    if let Some(quote) = leading_quote(after) {
        return match read_quoted(after, quote) {
            Some(module) => ParsedImport::Complete {
                module,
                names: Vec::new(),
                quote,
            },
            None => ParsedImport::Incomplete,
        };
    }

    let Some((clause, rest)) = split_at_from(after) else {
        return ParsedImport::Incomplete;
    };
    let specifier = rest.trim_start();
    let Some(quote) = leading_quote(specifier) else {
        return if specifier.is_empty() {
            ParsedImport::Incomplete
        } else {
            ParsedImport::Invalid
        };
    };
    match read_quoted(specifier, quote) {
        Some(module) => ParsedImport::Complete {
            module,
            names: parse_clause(clause),
            quote,
        },
        None => ParsedImport::Incomplete,
    }
}

/// Scan a file for import statements, including ones whose clause spans
/// several lines
pub(crate) fn scan_imports(text: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    let mut pending: Option<PendingImport> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        offset += line.len();

        if let Some(mut open) = pending.take() {
            open.statement.push_str(line);
            open.lines += 1;
            match parse_import_statement(&open.statement) {
                ParsedImport::Complete {
                    module,
                    names,
                    quote,
                } => imports.push(ImportStatement {
                    module,
                    names,
                    end: offset,
                    indent: open.indent,
                    quote,
                }),
                ParsedImport::Incomplete if open.lines < MAX_IMPORT_LINES => {
                    pending = Some(open);
                }
                _ => {}
            }
            continue;
        }

        let trimmed = line.trim_start();
        if !trimmed.starts_with("import") {
            continue;
        }
        let indent = line[..line.len() - trimmed.len()].to_string();
        match parse_import_statement(line) {
            ParsedImport::Complete {
                module,
                names,
                quote,
            } => imports.push(ImportStatement {
                module,
                names,
                end: offset,
                indent,
                quote,
            }),
            ParsedImport::Incomplete => {
                pending = Some(PendingImport {
                    indent,
                    statement: line.to_string(),
                    lines: 1,
                });
            }
            ParsedImport::Invalid => {}
        }
    }
    imports
}

/// Collapse the doubled-at typo some files carry in their module paths
fn normalized_module(specifier: &str) -> String {
    match specifier.strip_prefix("@@/") {
        Some(rest) => format!("@/{rest}"),
        None => specifier.to_string(),
    }
}

impl Rewriter {
    /// Make sure the helper functions are imported. Returns the new text
    /// when an import line was added.
    ///
    /// A helper counts as present when an import binds it or when the file
    /// declares it, so the helper module itself is left alone. Only the
    /// missing names get imported, which keeps a partially migrated file
    /// from ending up with a duplicate binding.
    pub(crate) fn inject_import(&self, text: &str) -> Option<String> {
        let rules = &self.rules;
        let imports = scan_imports(text);

        let mut bound: HashSet<&str> = HashSet::new();
        for import in &imports {
            for name in &import.names {
                bound.insert(name.as_str());
            }
        }

        let mut missing: Vec<&str> = Vec::new();
        for helper in [rules.url_helper.as_str(), rules.token_helper.as_str()] {
            if !bound.contains(helper) && !is_declared(text, helper) {
                missing.push(helper);
            }
        }
        if missing.is_empty() {
            return None;
        }

        let target = normalized_module(&rules.module);
        let anchor = imports
            .iter()
            .filter(|import| normalized_module(&import.module) == target)
            .next_back()
            .or_else(|| imports.last());

        let (insert_at, indent, quote) = match anchor {
            Some(import) => (import.end, import.indent.as_str(), import.quote),
            None => (0, "", '\''),
        };

        let names = missing.join(", ");
        let import_line = format!(
            "{indent}import {{ {names} }} from {quote}{module}{quote}\n",
            module = rules.module
        );

        let mut output = String::with_capacity(text.len() + import_line.len() + 1);
        output.push_str(&text[..insert_at]);
        if insert_at > 0 && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&import_line);
        output.push_str(&text[insert_at..]);
        Some(output)
    }
}

/// True when the file introduces the name through a declaration rather
/// than an import, like the helper module itself does
fn is_declared(text: &str, name: &str) -> bool {
    let pattern = format!(
        r"(?m)^\s*(?:export\s+)?(?:const|let|var|function|class|async\s+function)\s+{}\b",
        regex::escape(name)
    );
    match get_or_compile(&pattern) {
        Ok(re) => re.is_match(text).unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rewrite::engine::RewriteRules;
    use crate::rewrite::engine::enabled_passes;

    fn rewriter() -> Rewriter {
        let rules = RewriteRules::from_config(&Config::default()).unwrap();
        Rewriter::new(rules, enabled_passes(false, false, false))
    }

    #[test]
    fn test_scan_named_import() {
        let text = "import { pb, getApiUrl } from '@/lib/pocketbase'\n";
        let imports = scan_imports(text);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "@/lib/pocketbase");
        assert_eq!(imports[0].names, vec!["pb", "getApiUrl"]);
        assert_eq!(imports[0].quote, '\'');
        assert_eq!(imports[0].end, text.len());
    }

    #[test]
    fn test_scan_default_namespace_and_renames() {
        let text = "\
import React from \"react\"
import * as utils from './utils'
import { useState as useLocal, useEffect } from 'react'
";
        let imports = scan_imports(text);
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].names, vec!["React"]);
        assert_eq!(imports[0].quote, '"');
        assert_eq!(imports[1].names, vec!["utils"]);
        assert_eq!(imports[2].names, vec!["useLocal", "useEffect"]);
    }

    #[test]
    fn test_scan_side_effect_and_multiline() {
        let text = "\
import './globals.css'
import {
  pb,
  getApiUrl,
} from '@/lib/pocketbase'
const x = 1
";
        let imports = scan_imports(text);
        assert_eq!(imports.len(), 2);
        assert!(imports[0].names.is_empty());
        assert_eq!(imports[0].module, "./globals.css");
        assert_eq!(imports[1].names, vec!["pb", "getApiUrl"]);
        assert_eq!(
            &text[imports[1].end..],
            "const x = 1\n"
        );
    }

    #[test]
    fn test_scan_skips_lookalikes() {
        let text = "\
// import { fake } from 'nowhere'
const imports = ['a']
importantWork()
";
        assert!(scan_imports(text).is_empty());
    }

    #[test]
    fn test_inject_after_helper_module_import() {
        let input = "\
import { pb } from '@/lib/pocketbase'
import { useState } from 'react'

export function Page() {}
";
        let output = rewriter().inject_import(input).unwrap();
        let expected = "\
import { pb } from '@/lib/pocketbase'
import { getApiUrl, getAuthToken } from '@/lib/pocketbase'
import { useState } from 'react'

export function Page() {}
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_inject_falls_back_to_last_import() {
        let input = "\
\"use client\"

import { useState } from \"react\"
import { Button } from \"@/components/ui/button\"

export function Page() {}
";
        let output = rewriter().inject_import(input).unwrap();
        // The injected line follows the last import and picks up its quoting
        assert!(output.contains(
            "import { Button } from \"@/components/ui/button\"\nimport { getApiUrl, getAuthToken } from \"@/lib/pocketbase\"\n"
        ));
    }

    #[test]
    fn test_inject_prepends_when_no_imports() {
        let input = "const x = 1\n";
        let output = rewriter().inject_import(input).unwrap();
        assert_eq!(
            output,
            "import { getApiUrl, getAuthToken } from '@/lib/pocketbase'\nconst x = 1\n"
        );
    }

    #[test]
    fn test_inject_only_missing_names() {
        let input = "import { pb, getApiUrl } from '@/lib/pocketbase'\n";
        let output = rewriter().inject_import(input).unwrap();
        assert_eq!(
            output,
            "import { pb, getApiUrl } from '@/lib/pocketbase'\nimport { getAuthToken } from '@/lib/pocketbase'\n"
        );
    }

    #[test]
    fn test_inject_noop_when_bound() {
        let input = "import { getApiUrl, getAuthToken } from '@/lib/pocketbase'\n";
        assert!(rewriter().inject_import(input).is_none());
    }

    #[test]
    fn test_inject_noop_in_helper_module_itself() {
        let input = "\
import PocketBase from 'pocketbase'

export const getApiUrl = (path: string) => `${API_URL}/api/${path}`

export function getAuthToken(): string | null {
  return pb.authStore.token
}
";
        assert!(rewriter().inject_import(input).is_none());
    }

    #[test]
    fn test_comment_mention_does_not_suppress_injection() {
        let input = "\
import { useState } from 'react'

// TODO: switch this to getApiUrl and getAuthToken
const x = 1
";
        let output = rewriter().inject_import(input).unwrap();
        assert!(output.contains("import { getApiUrl, getAuthToken } from '@/lib/pocketbase'"));
    }

    #[test]
    fn test_doubled_at_typo_is_recognized_as_anchor() {
        let input = "import { pb } from '@@/lib/pocketbase'\nconst x = 1\n";
        let output = rewriter().inject_import(input).unwrap();
        // Anchored below the typo'd import, but emitted with the configured path
        assert_eq!(
            output,
            "import { pb } from '@@/lib/pocketbase'\nimport { getApiUrl, getAuthToken } from '@/lib/pocketbase'\nconst x = 1\n"
        );
    }

    #[test]
    fn test_inject_at_end_of_file_without_newline() {
        let input = "import { pb } from '@/lib/pocketbase'";
        let output = rewriter().inject_import(input).unwrap();
        assert_eq!(
            output,
            "import { pb } from '@/lib/pocketbase'\nimport { getApiUrl, getAuthToken } from '@/lib/pocketbase'\n"
        );
    }

    #[test]
    fn test_indented_imports_keep_indentation() {
        let input = "  import { pb } from '@/lib/pocketbase'\n  const x = 1\n";
        let output = rewriter().inject_import(input).unwrap();
        assert!(output.contains("\n  import { getApiUrl, getAuthToken } from '@/lib/pocketbase'\n"));
    }
}
