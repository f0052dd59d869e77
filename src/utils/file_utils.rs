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
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// True when the entry name contains any of the exclude substrings
fn is_excluded(name: &str, exclude: &[String]) -> bool {
    exclude
        .iter()
        .any(|pattern| !pattern.is_empty() && name.contains(pattern.as_str()))
}

/// True when the path carries one of the allowed extensions
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions.iter().any(|allowed| allowed == ext),
        None => false,
    }
}

/// Walk `root` and collect every file with one of the allowed extensions.
/// A directory whose name contains an exclude substring prunes its whole
/// subtree, so excluded files are never opened at all. The result is
/// sorted to keep runs deterministic.
pub fn discover_files(root: &Path, extensions: &[String], exclude: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !is_excluded(&entry.file_name().to_string_lossy(), exclude)
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Copy `path` to `path.bak` so the original survives an in-place rewrite
pub fn backup_file(path: &Path) -> io::Result<PathBuf> {
    let mut backup = path.to_path_buf().into_os_string();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Display a path relative to the project root when possible
pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "content").unwrap();
    }

    #[test]
    fn test_discover_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.tsx"));
        touch(&root.join("a.ts"));
        touch(&root.join("readme.md"));
        touch(&root.join("hooks/use-data.jsx"));
        touch(&root.join("node_modules/pkg/index.ts"));
        touch(&root.join(".next/cache/page.tsx"));

        let extensions = vec!["ts".to_string(), "tsx".to_string(), "jsx".to_string()];
        let exclude = vec!["node_modules".to_string(), ".next".to_string()];
        let files = discover_files(root, &extensions, &exclude);

        let names: Vec<String> = files
            .iter()
            .map(|f| relative_display(root, f))
            .collect();
        assert_eq!(names, vec!["a.ts", "b.tsx", "hooks/use-data.jsx"]);
    }

    #[test]
    fn test_discover_files_excluded_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("kept.ts"));
        touch(&root.join("data.next.ts"));

        let extensions = vec!["ts".to_string()];
        let exclude = vec![".next".to_string()];
        let files = discover_files(root, &extensions, &exclude);
        assert_eq!(files, vec![root.join("kept.ts")]);
    }

    #[test]
    fn test_extension_matching_is_exact() {
        let extensions = vec!["ts".to_string()];
        assert!(has_extension(Path::new("a.ts"), &extensions));
        assert!(!has_extension(Path::new("a.tsx"), &extensions));
        assert!(!has_extension(Path::new("a.TS"), &extensions));
        assert!(!has_extension(Path::new("ts"), &extensions));
    }

    #[test]
    fn test_backup_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.tsx");
        fs::write(&path, "original").unwrap();

        let backup = backup_file(&path).unwrap();
        assert_eq!(backup, dir.path().join("page.tsx.bak"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "original");
    }
}
