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

/// Which variant of the localStorage idiom was recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthShape {
    /// Destructures `{ token }` and nothing else
    TokenOnly,
    /// Destructures `{ token, record }`
    TokenRecord,
    /// Destructures `{ token, record }` and derives a user id from the record
    TokenRecordUserId,
}

struct AuthMatch {
    /// Byte offset of the anchor statement
    start: usize,
    /// Byte offset just past the last matched statement
    end: usize,
    shape: AuthShape,
    /// Leading whitespace of the anchor's line, reused for every
    /// replacement line after the first
    indent: String,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// A forward-only scanner over the statements that follow the anchor.
/// Statements may be split across lines however the file likes, which is
/// what the old regex templates couldn't cope with.
#[derive(Clone)]
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Cursor { text, pos }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Semicolons between statements are incidental formatting
    fn skip_ws_and_semis(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if !c.is_whitespace() && c != ';' {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    /// Like eat_str, but the next character must not continue an identifier
    fn eat_ident(&mut self, ident: &str) -> bool {
        if !self.rest().starts_with(ident) {
            return false;
        }
        let after = self.text[self.pos + ident.len()..].chars().next();
        if after.is_some_and(is_ident_char) {
            return false;
        }
        self.pos += ident.len();
        true
    }

    /// A single- or double-quoted string whose content matches verbatim
    fn eat_quoted(&mut self, content: &str) -> bool {
        let rest = self.rest();
        let Some(quote) = rest.chars().next().filter(|c| matches!(c, '\'' | '"')) else {
            return false;
        };
        let inner_start = quote.len_utf8();
        let Some(inner) = rest.get(inner_start..inner_start + content.len()) else {
            return false;
        };
        if inner != content {
            return false;
        }
        let close = rest[inner_start + content.len()..].chars().next();
        if close != Some(quote) {
            return false;
        }
        self.pos += inner_start + content.len() + quote.len_utf8();
        true
    }
}

/// `const userId = record.id` (or the optional-chained spelling)
fn eat_user_extraction(cur: &mut Cursor) -> bool {
    if !cur.eat_ident("const") {
        return false;
    }
    cur.skip_ws();
    if !cur.eat_ident("userId") {
        return false;
    }
    cur.skip_ws();
    if !cur.eat_char('=') {
        return false;
    }
    cur.skip_ws();
    if !cur.eat_ident("record") {
        return false;
    }
    cur.eat_char('?');
    if !cur.eat_char('.') {
        return false;
    }
    if !cur.eat_ident("id") {
        return false;
    }
    cur.eat_char(';');
    true
}

impl Rewriter {
    /// Replace every occurrence of the known localStorage auth idiom with
    /// the token helper form. Returns the new text when anything matched.
    pub(crate) fn replace_auth(&self, text: &str) -> Option<String> {
        let mut output = String::new();
        let mut cursor = 0;
        while let Some(found) = self.next_auth_match(text, cursor) {
            output.push_str(&text[cursor..found.start]);
            output.push_str(&self.auth_replacement(found.shape, &found.indent));
            cursor = found.end;
        }
        if cursor == 0 {
            return None;
        }
        output.push_str(&text[cursor..]);
        Some(output)
    }

    /// Find the next anchor occurrence that really starts the idiom.
    /// Anchors whose following statements don't line up are skipped, so a
    /// lone getItem call elsewhere in the file never trips the matcher.
    fn next_auth_match(&self, text: &str, mut from: usize) -> Option<AuthMatch> {
        let anchor = &self.rules.storage_anchor;
        while let Some(found) = text[from..].find(anchor.as_str()) {
            let start = from + found;
            if let Some(auth_match) = self.parse_auth_at(text, start) {
                return Some(auth_match);
            }
            from = start + anchor.len();
        }
        None
    }

    /// Walk the statements that must follow the anchor: the throw guard
    /// (braced or not), the `{ token }` or `{ token, record }` destructure
    /// of JSON.parse, and optionally the user id extraction. Identifier
    /// names, their order, and string literals have to match exactly;
    /// whitespace and semicolons don't.
    fn parse_auth_at(&self, text: &str, start: usize) -> Option<AuthMatch> {
        let rules = &self.rules;
        let mut cur = Cursor::new(text, start + rules.storage_anchor.len());
        cur.eat_char(';');
        cur.skip_ws();

        if !cur.eat_ident("if") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char('(') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char('!') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_ident("authData") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char(')') {
            return None;
        }
        cur.skip_ws();

        let braced = cur.eat_char('{');
        if braced {
            cur.skip_ws();
        }
        if !cur.eat_ident("throw") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_ident("new") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_ident("Error") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char('(') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_quoted(&rules.error_message) {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char(')') {
            return None;
        }
        cur.skip_ws_and_semis();
        if braced {
            if !cur.eat_char('}') {
                return None;
            }
            cur.skip_ws_and_semis();
        }

        if !cur.eat_ident("const") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char('{') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_ident("token") {
            return None;
        }
        cur.skip_ws();
        let has_record = if cur.eat_char(',') {
            cur.skip_ws();
            if !cur.eat_ident("record") {
                return None;
            }
            cur.skip_ws();
            true
        } else {
            false
        };
        if !cur.eat_char('}') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char('=') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_str("JSON.parse") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char('(') {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_ident("authData") {
            return None;
        }
        cur.skip_ws();
        if !cur.eat_char(')') {
            return None;
        }
        cur.eat_char(';');

        let mut shape = if has_record {
            AuthShape::TokenRecord
        } else {
            AuthShape::TokenOnly
        };
        let mut end = cur.pos;

        if has_record {
            let mut look = cur.clone();
            look.skip_ws_and_semis();
            if eat_user_extraction(&mut look) {
                shape = AuthShape::TokenRecordUserId;
                end = look.pos;
            }
        }

        let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &text[line_start..start];
        let indent = if prefix.chars().all(char::is_whitespace) {
            prefix.to_string()
        } else {
            String::new()
        };

        Some(AuthMatch {
            start,
            end,
            shape,
            indent,
        })
    }

    /// The replacement block for a recognized idiom. The first line lands
    /// where the anchor began, so only the following lines carry the indent.
    fn auth_replacement(&self, shape: AuthShape, indent: &str) -> String {
        let rules = &self.rules;
        let token_helper = &rules.token_helper;
        let storage_key = &rules.storage_key;
        let message = &rules.error_message;
        match shape {
            AuthShape::TokenOnly => format!(
                "const token = {token_helper}()\n\
                 {indent}if (!token) throw new Error('{message}')"
            ),
            AuthShape::TokenRecord => format!(
                "const authData = localStorage.getItem('{storage_key}')\n\
                 {indent}if (!authData) throw new Error('{message}')\n\
                 {indent}const {{ record }} = JSON.parse(authData)\n\
                 {indent}const token = {token_helper}()"
            ),
            AuthShape::TokenRecordUserId => format!(
                "const authData = localStorage.getItem('{storage_key}')\n\
                 {indent}if (!authData) throw new Error('{message}')\n\
                 {indent}const {{ record }} = JSON.parse(authData)\n\
                 {indent}const userId = record?.id\n\
                 {indent}const token = {token_helper}()"
            ),
        }
    }
}
