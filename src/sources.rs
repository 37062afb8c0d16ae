//! # Source Scanning
//!
//! Finds the source files of the repository the game is run in. Their text becomes the
//! background of the dungeon floor, and their hashes become the seed of the run.

use crate::{config, CrawlResult};
use log::{debug, trace};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions treated as source code.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "go", "js", "ts", "tsx", "jsx", "py", "rb", "rs", "c", "cpp", "cc", "h", "hpp", "java", "cs",
    "swift", "kt", "scala", "php", "pl", "sh", "bash", "zsh", "lua", "r", "m", "mm", "zig", "nim",
    "ex", "exs", "erl", "hs", "ml", "fs", "clj", "lisp", "el", "vim",
];

/// Directory names never descended into, in addition to hidden ones.
pub const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", "vendor", "dist", "build", "target"];

/// A source file kept as background text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
    /// SHA-256 of the lines joined with `\n`
    pub digest: [u8; 32],
}

impl SourceFile {
    /// Wraps already-read lines and hashes them.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::SourceFile;
    ///
    /// let a = SourceFile::new("a.rs", vec!["fn main() {}".to_string()]);
    /// let b = SourceFile::new("b.rs", vec!["fn main() {}".to_string()]);
    /// assert_eq!(a.digest, b.digest);
    /// ```
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(lines.join("\n").as_bytes()));
        Self {
            path: path.into(),
            lines,
            digest,
        }
    }

    /// Reads a file from disk. Invalid UTF-8 is replaced rather than rejected.
    pub fn read(path: &Path) -> CrawlResult<Self> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let lines = text.lines().map(str::to_owned).collect();
        Ok(Self::new(path, lines))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

fn is_skipped_directory(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRECTORIES.contains(&name)
}

/// Recursively collects every source file under `dir` with at least `min_lines` lines.
///
/// Entries are visited in path order. Unreadable entries are skipped.
fn collect(dir: &Path, min_lines: usize, found: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        trace!("Skipping unreadable directory {}", dir.display());
        return;
    };

    let mut entries: Vec<_> = entries.filter_map(|entry| entry.ok()).collect();
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            let name = entry.file_name();
            if !is_skipped_directory(&name.to_string_lossy()) {
                collect(&path, min_lines, found);
            }
        } else if file_type.is_file() && is_source_file(&path) {
            match SourceFile::read(&path) {
                Ok(file) if file.line_count() >= min_lines => found.push(file),
                Ok(_) => {}
                Err(e) => trace!("Skipping {}: {}", path.display(), e),
            }
        }
    }
}

/// Finds the longest source files under `root`.
///
/// Hidden directories and dependency or build output directories are skipped. Files with
/// fewer than `min_lines` lines are ignored. At most `max_files` files are returned, longest
/// first. Only a `root` that cannot be read is an error.
pub fn find_source_files(
    root: impl AsRef<Path>,
    min_lines: usize,
    max_files: usize,
) -> CrawlResult<Vec<SourceFile>> {
    let root = root.as_ref();
    // Fail on an unreadable root; everything below it is best effort
    fs::read_dir(root)?;

    let mut found = Vec::new();
    collect(root, min_lines, &mut found);

    found.sort_by(|a, b| b.line_count().cmp(&a.line_count()));
    found.truncate(max_files);

    debug!(
        "Found {} source files under {}",
        found.len(),
        root.display()
    );
    Ok(found)
}

/// Derives the run seed from the file digests.
///
/// The seed is the first eight bytes, big-endian, of SHA-256 over the concatenated digests.
pub fn compute_seed(files: &[SourceFile]) -> u64 {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.digest);
    }
    let sum = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&sum[..8]);
    u64::from_be_bytes(head)
}

/// The run seed, or the default seed when no files were found.
pub fn seed_or_default(files: &[SourceFile]) -> u64 {
    if files.is_empty() {
        config::DEFAULT_SEED
    } else {
        compute_seed(files)
    }
}
