//! `morefs_io_fs` v1:
//! Path classification and small filesystem helpers for build/job tools.
//!
//! Modules:
//! - `fileset`  : literal path + glob pattern classification (`FileSet`)
//! - `resolver` : glob expansion and existence probes (`GlobResolver`)
//! - `expand`   : recursive directory expansion with include/exclude
//! - `path`     : safe/output/temp path derivation
//! - `ops`      : move, delete, copy, directory helpers
//! - `report`   : copy run report model
//! - `spec`     : enums/options/errors
//! - `util`     : shared helper functions

pub mod expand;
pub mod fileset;
pub mod ops;
pub mod path;
pub mod report;
pub mod resolver;
pub mod spec;
mod util;

pub use expand::expand_directory;
pub use fileset::FileSet;
pub use ops::{copy_files, delete_file, make_dir, move_file, preserve_dates, remove_dir};
pub use path::{
    SAFE_PATH_MAX_ATTEMPTS, get_output_path, get_safe_path, get_sub_dir_path, get_temp_dir,
    get_temp_file_path, replace_file_extension,
};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use resolver::{FsGlobResolver, GlobResolver, expand_glob_paths};
pub use spec::{
    EnumEntryKind, EnumPatternMode, MoreFsError, SpecCopyError, SpecCopyOptions, SpecEntry,
    SpecExpandOptions, SpecGlobMatch, SpecGlobOptions, SpecMoveOptions,
};
