//! Note discovery under the target directory

use crate::domain::{is_note_path, NoteFile, ScanStats};
use crate::utils::normalize_path;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walks a posts tree and returns every Markdown note in relative-path order.
pub struct NoteScanner {
    root_path: PathBuf,
    exclude_globs: Vec<String>,
    respect_gitignore: bool,
    follow_symlinks: bool,
    stats: ScanStats,
}

impl NoteScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            exclude_globs: Vec::new(),
            // Generated post trees are usually gitignored themselves.
            respect_gitignore: false,
            follow_symlinks: false,
            stats: ScanStats::default(),
        }
    }

    /// Set glob patterns (matched against the relative path) to exclude
    pub fn exclude_globs(mut self, globs: Vec<String>) -> Self {
        self.exclude_globs = globs;
        self
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn build_exclude_globset(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_globs {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!("ignoring invalid exclude glob {:?}: {}", pattern, e),
            }
        }
        builder.build().context("Failed to build exclude glob set")
    }

    /// Scan the tree. A missing root yields no notes rather than an error.
    pub fn scan(&mut self) -> Result<Vec<NoteFile>> {
        self.stats = ScanStats::default();
        if !self.root_path.is_dir() {
            tracing::warn!("target not found: {}", self.root_path.display());
            return Ok(Vec::new());
        }

        let exclude_globset = self.build_exclude_globset()?;

        let dir_filter = |entry: &ignore::DirEntry| -> bool {
            if entry.file_type().is_some_and(|ft| ft.is_dir()) && entry.depth() > 0 {
                if let Some(name) = entry.file_name().to_str() {
                    if matches!(name, "node_modules" | ".git") || name.starts_with('.') {
                        return false;
                    }
                }
            }
            true
        };

        let mut builder = WalkBuilder::new(&self.root_path);
        builder
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .follow_links(self.follow_symlinks)
            .hidden(false)
            .parents(self.respect_gitignore)
            .filter_entry(dir_filter);

        let mut notes = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            self.stats.files_scanned += 1;

            let rel_path = match path.strip_prefix(&self.root_path) {
                Ok(p) => normalize_path(&p.to_string_lossy()),
                Err(_) => continue,
            };

            if exclude_globset.is_match(&rel_path) {
                self.stats.files_skipped_glob += 1;
                continue;
            }
            if !is_note_path(&rel_path) {
                self.stats.files_skipped_extension += 1;
                continue;
            }

            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            self.stats.files_included += 1;
            self.stats.total_bytes_included += size_bytes;
            notes.push(NoteFile { path: path.to_path_buf(), relative_path: rel_path, size_bytes });
        }

        notes.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::debug!(
            "scanned {}: {} notes of {} files",
            self.root_path.display(),
            self.stats.files_included,
            self.stats.files_scanned
        );
        Ok(notes)
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

/// Relative path of `path` under `root` with forward slashes, or the bare file name.
pub fn relative_note_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => normalize_path(&rel.to_string_lossy()),
        Err(_) => path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scanner_finds_markdown_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "z.md", "z");
        write(root, "Java/b.markdown", "b");
        write(root, "Java/a.MD", "a");
        write(root, "Java/image/a.png", "png");
        write(root, "notes.txt", "txt");

        let mut scanner = NoteScanner::new(root.to_path_buf());
        let notes = scanner.scan().unwrap();
        let paths: Vec<&str> = notes.iter().map(|n| n.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["Java/a.MD", "Java/b.markdown", "z.md"]);

        let stats = scanner.stats();
        assert_eq!(stats.files_scanned, 5);
        assert_eq!(stats.files_included, 3);
        assert_eq!(stats.files_skipped_extension, 2);
    }

    #[test]
    fn test_exclude_globs_and_hidden_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "keep.md", "k");
        write(root, "drafts/wip.md", "w");
        write(root, ".obsidian/x.md", "x");
        write(root, "node_modules/pkg/readme.md", "r");

        let mut scanner =
            NoteScanner::new(root.to_path_buf()).exclude_globs(vec!["drafts/**".to_string()]);
        let notes = scanner.scan().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].relative_path, "keep.md");
        assert_eq!(scanner.stats().files_skipped_glob, 1);
    }

    #[test]
    fn test_gitignored_posts_are_still_scanned_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        write(root, ".gitignore", "*.md\n");
        write(root, "post.md", "p");

        let notes = NoteScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(notes.len(), 1);

        let notes = NoteScanner::new(root.to_path_buf()).respect_gitignore(true).scan().unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let notes = NoteScanner::new(temp_dir.path().join("missing")).scan().unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_relative_note_path() {
        let root = Path::new("/site/source/_posts");
        assert_eq!(relative_note_path(root, &root.join("Java").join("a.md")), "Java/a.md");
        assert_eq!(relative_note_path(root, Path::new("/elsewhere/b.md")), "b.md");
    }
}
