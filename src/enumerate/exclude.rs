//! File exclusion rules
//!
//! A file is skipped when its own name is an excluded file name, or when any
//! directory between the source root and the file is an excluded directory
//! name. Matching is on whole path segments.

use std::ffi::OsStr;
use std::path::{Component, Path};

/// OS metadata files never uploaded
pub const EXCLUDED_FILES: &[&str] = &[".DS_Store"];

/// Version-control, IDE and dependency directories whose files are skipped
pub const EXCLUDED_DIRS: &[&str] = &[".git", ".idea", "node_modules"];

/// Name-based exclusion policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    files: Vec<String>,
    dirs: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            files: EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            dirs: EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExclusionRules {
    /// Rules excluding nothing
    pub fn none() -> Self {
        Self {
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }

    /// Whether a base name is on the file list
    pub fn is_excluded_file_name(&self, name: &OsStr) -> bool {
        self.files.iter().any(|f| OsStr::new(f) == name)
    }

    /// Whether a directory name is on the directory list
    pub fn is_excluded_dir_name(&self, name: &OsStr) -> bool {
        self.dirs.iter().any(|d| OsStr::new(d) == name)
    }

    /// Check a file path relative to the source root
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if relative
            .file_name()
            .is_some_and(|name| self.is_excluded_file_name(name))
        {
            return true;
        }

        relative
            .parent()
            .map(|dir| {
                dir.components().any(|c| match c {
                    Component::Normal(segment) => self.is_excluded_dir_name(segment),
                    _ => false,
                })
            })
            .unwrap_or(false)
    }
}
