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
/// Replace the localStorage auth idiom with token helper calls. Contains the
/// Rewriter implementation for the auth pass.
pub mod auth;
/// The rule set compiled from configuration, and the pass pipeline
pub mod engine;
/// Scan import statements and inject the helper import. Contains the Rewriter
/// implementation for the import pass.
pub mod imports;
/// Handle passed arguments
pub mod match_args;
/// Per-file rewriting and batch reporting
pub mod runner;
/// Fold hardcoded api url literals into helper calls. Contains the Rewriter
/// implementation for the url pass.
pub mod urls;
