use std::path::PathBuf;

/// A Markdown note discovered under the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    pub path: PathBuf,
    /// POSIX-style path relative to the target root; the key used by every index.
    pub relative_path: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_included: usize,
    pub files_skipped_extension: usize,
    pub files_skipped_glob: usize,
    pub total_bytes_included: u64,
}
