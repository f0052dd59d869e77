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
use fancy_regex::Captures;
use std::borrow::Cow;

impl Rewriter {
    /// Fold '<api_base>/api/<path>' string literals into url helper calls,
    /// keeping whatever quote character the literal used. Returns the new
    /// text when at least one literal was replaced.
    pub(crate) fn replace_urls(&self, text: &str) -> Option<String> {
        let helper = &self.rules.url_helper;
        let replaced = self.rules.url_regex.replace_all(text, |caps: &Captures| {
            let quote = &caps[1];
            let path = &caps[2];
            format!("{helper}({quote}{path}{quote})")
        });
        match replaced {
            Cow::Borrowed(_) => None,
            Cow::Owned(new_text) => Some(new_text),
        }
    }
}
