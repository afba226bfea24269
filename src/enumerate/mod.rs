//! Source tree enumeration
//!
//! Turns a source path and a remote destination root into [`UploadJob`]s:
//!
//! - a single file yields one job whose destination is the root unchanged;
//! - a directory is walked recursively and each file lands in the root joined
//!   with its parent directory relative to the source
//!   (`src/a.txt` → `/assets`, `src/sub/b.txt` → `/assets/sub`).
//!
//! Excluded names (see [`exclude`]) are filtered per file; traversal itself is
//! not pruned. Entries that cannot be read during the walk are logged and
//! skipped.
//!
//! # Example
//!
//! ```no_run
//! use tree_uploader::enumerate::enumerate_jobs;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! for job in enumerate_jobs(Path::new("./site"), "/assets")? {
//!     println!("{job}");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use crate::uploader::UploadJob;

pub mod exclude;

pub use exclude::ExclusionRules;

/// Enumeration errors
#[derive(Debug, thiserror::Error)]
pub enum EnumerateError {
    /// Source path does not exist
    #[error("source path not found: {0}")]
    NotFound(PathBuf),

    /// Source path could not be made absolute
    #[error("cannot resolve {path}: {source}")]
    Io {
        /// Path being resolved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Enumerate jobs for `source` with the default exclusion rules
pub fn enumerate_jobs(
    source: &Path,
    destination_root: &str,
) -> Result<FileEnumerator, EnumerateError> {
    enumerate_jobs_with(source, destination_root, ExclusionRules::default())
}

/// Enumerate jobs for `source` with custom exclusion rules
pub fn enumerate_jobs_with(
    source: &Path,
    destination_root: &str,
    rules: ExclusionRules,
) -> Result<FileEnumerator, EnumerateError> {
    if !source.exists() {
        return Err(EnumerateError::NotFound(source.to_path_buf()));
    }

    let root = std::path::absolute(source).map_err(|e| EnumerateError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    let state = if root.is_dir() {
        trace!(root = %root.display(), "Walking source directory");
        EnumeratorState::Walk {
            walker: WalkDir::new(&root).sort_by_file_name().into_iter(),
            root,
            rules,
        }
    } else {
        EnumeratorState::Single(Some(UploadJob::new(root, destination_root)))
    };

    Ok(FileEnumerator {
        destination_root: destination_root.to_string(),
        state,
    })
}

/// Lazy, finite, single-pass sequence of upload jobs
pub struct FileEnumerator {
    destination_root: String,
    state: EnumeratorState,
}

enum EnumeratorState {
    Single(Option<UploadJob>),
    Walk {
        root: PathBuf,
        walker: walkdir::IntoIter,
        rules: ExclusionRules,
    },
}

impl Iterator for FileEnumerator {
    type Item = UploadJob;

    fn next(&mut self) -> Option<UploadJob> {
        match &mut self.state {
            EnumeratorState::Single(job) => job.take(),
            EnumeratorState::Walk {
                root,
                walker,
                rules,
            } => loop {
                let entry = match walker.next()? {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                // Symlinked files are uploaded, symlinked directories are not followed.
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if !is_file {
                    continue;
                }

                let Ok(relative) = entry.path().strip_prefix(root.as_path()) else {
                    continue;
                };
                if rules.is_excluded(relative) {
                    trace!(path = %relative.display(), "Excluded");
                    continue;
                }

                let destination = match relative.parent() {
                    Some(dir) => remote_join(&self.destination_root, dir),
                    None => self.destination_root.clone(),
                };
                return Some(UploadJob::new(entry.into_path(), destination));
            },
        }
    }
}

/// Join a remote root with a relative local directory using `/` separators.
///
/// An empty relative directory returns the root unchanged.
pub fn remote_join(root: &str, relative_dir: &Path) -> String {
    let segments: Vec<String> = relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return root.to_string();
    }
    format!("{}/{}", root.trim_end_matches('/'), segments.join("/"))
}
