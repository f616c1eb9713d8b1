//! Classification enums, option models and the top-level error type.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Classification of one resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum EnumEntryKind {
    /// Input matched nothing on disk.
    Missing = 0,
    /// Existing non-directory entry.
    File = 1,
    /// Existing directory.
    Directory = 2,
}

impl EnumEntryKind {
    /// Numeric code (`0`, `1`, `2`).
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<EnumEntryKind> for u8 {
    fn from(value: EnumEntryKind) -> Self {
        value.code()
    }
}

/// Pattern matching mode for include/exclude filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumPatternMode {
    /// Regular expression, unanchored search over the whole path.
    #[default]
    Regex,
    /// Shell-like wildcards matched against the whole path.
    Glob,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndOptions

/// One classified path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecEntry {
    /// Path string exactly as probed or as returned by glob expansion.
    pub path: String,
    /// Classification tag.
    pub kind: EnumEntryKind,
}

/// One glob match tagged with its kind (`File` or `Directory`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecGlobMatch {
    pub path: String,
    pub kind: EnumEntryKind,
}

/// Match options for the filesystem glob resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecGlobOptions {
    /// Match letters case-sensitively.
    pub if_case_sensitive: bool,
    /// `*`, `?` and classes never match a path separator.
    pub if_literal_separator: bool,
    /// Wildcards may match a leading `.` in a path component.
    pub if_dot: bool,
}

impl Default for SpecGlobOptions {
    fn default() -> Self {
        Self {
            if_case_sensitive: true,
            if_literal_separator: true,
            if_dot: false,
        }
    }
}

/// Input options for `expand_directory`.
#[derive(Debug, Clone, Default)]
pub struct SpecExpandOptions {
    /// Keep only paths matching this pattern.
    pub pattern_include: Option<String>,
    /// Drop paths matching this pattern.
    pub pattern_exclude: Option<String>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumPatternMode,
}

/// Input options for `move_file`.
#[derive(Debug, Clone, Copy)]
pub struct SpecMoveOptions {
    /// Never overwrite: pick a free destination with `get_safe_path`.
    pub if_safe: bool,
    /// Copy access/modification times from source to destination.
    pub if_preserve_dates: bool,
}

impl Default for SpecMoveOptions {
    fn default() -> Self {
        Self {
            if_safe: true,
            if_preserve_dates: false,
        }
    }
}

/// Input options for `copy_files`.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Copy permissions, timestamps and extended attributes.
    pub if_preserve_metadata: bool,
    /// Maximum worker threads for the file-copy stage.
    pub num_workers_max: Option<usize>,
    /// Do not mutate filesystem; record what would happen.
    pub if_dry_run: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            if_preserve_metadata: true,
            num_workers_max: Some(1),
            if_dry_run: false,
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors returned by the library's top-level calls.
#[derive(Debug, thiserror::Error)]
pub enum MoreFsError {
    /// Malformed matcher or empty required name, raised before any IO.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Probe, listing, expansion or mutation failure other than not-found.
    #[error("Filesystem fault at {}: {source}", .path.display())]
    FilesystemFault {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// `move_file` source does not exist.
    #[error("File does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// `get_safe_path` could not produce a free path.
    #[error("No free path found for {} after {attempts} attempt(s)", .path.display())]
    SafePathExhausted { path: PathBuf, attempts: usize },
    /// Copy destination exists and is not a directory.
    #[error("Destination is not a directory: {}", .0.display())]
    DestinationNotDirectory(PathBuf),
}

impl MoreFsError {
    pub(crate) fn fault(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FilesystemFault {
            path: path.into(),
            source,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
