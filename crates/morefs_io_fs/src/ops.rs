//! File manipulation helpers: move, delete, copy, directory create/remove.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::{FileTime, set_file_times};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::path::get_safe_path;
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::resolver::is_not_found;
use crate::spec::{MoreFsError, SpecCopyOptions, SpecMoveOptions};
use crate::util::{calculate_worker_limit, copy_file_with_metadata};

////////////////////////////////////////////////////////////////////////////////
// #region MoveDelete

/// Move `from` to `to`, creating the destination's parent directories.
///
/// With `if_safe` an existing destination is never overwritten; the file
/// lands on the path returned by [`get_safe_path`] instead. A rename across
/// filesystems falls back to copy + unlink. Returns the final destination.
pub fn move_file(
    from: &str,
    to: &str,
    spec_move_options: SpecMoveOptions,
) -> Result<String, MoreFsError> {
    let path_from = Path::new(from);
    match fs::symlink_metadata(path_from) {
        Ok(_) => {}
        Err(e) if is_not_found(&e) => return Err(MoreFsError::SourceNotFound(path_from.into())),
        Err(e) => return Err(MoreFsError::fault(path_from, e)),
    }

    if let Some(path_parent) = Path::new(to).parent() {
        make_dir(path_parent)?;
    }

    let to = if spec_move_options.if_safe {
        get_safe_path(to)?
    } else {
        to.to_string()
    };
    let path_to = Path::new(&to);

    let stat_from = fs::metadata(path_from).map_err(|e| MoreFsError::fault(path_from, e))?;
    match fs::rename(path_from, path_to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(from, to = %to, "rename crosses devices, copying instead");
            fs::copy(path_from, path_to).map_err(|e| MoreFsError::fault(path_to, e))?;
            fs::remove_file(path_from).map_err(|e| MoreFsError::fault(path_from, e))?;
        }
        Err(e) => return Err(MoreFsError::fault(path_from, e)),
    }

    if spec_move_options.if_preserve_dates {
        apply_dates(&stat_from, path_to)?;
    }
    Ok(to)
}

/// Delete `file` if it exists. Returns whether something was removed.
pub fn delete_file(file: impl AsRef<Path>) -> Result<bool, MoreFsError> {
    let path_file = file.as_ref();
    match fs::remove_file(path_file) {
        Ok(()) => Ok(true),
        Err(e) if is_not_found(&e) => Ok(false),
        Err(e) => Err(MoreFsError::fault(path_file, e)),
    }
}

/// Copy access and modification times from `from` to `to`.
pub fn preserve_dates(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<(), MoreFsError> {
    let path_from = from.as_ref();
    let stat_from = fs::metadata(path_from).map_err(|e| MoreFsError::fault(path_from, e))?;
    apply_dates(&stat_from, to.as_ref())
}

fn apply_dates(stat_from: &fs::Metadata, path_to: &Path) -> Result<(), MoreFsError> {
    set_file_times(
        path_to,
        FileTime::from_last_access_time(stat_from),
        FileTime::from_last_modification_time(stat_from),
    )
    .map_err(|e| MoreFsError::fault(path_to, e))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Directories

/// Create `dir` and any missing parents. Existing directories are fine.
pub fn make_dir(dir: impl AsRef<Path>) -> Result<(), MoreFsError> {
    let path_dir = dir.as_ref();
    if path_dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path_dir).map_err(|e| MoreFsError::fault(path_dir, e))
}

/// Recursively remove `dir`. A missing directory is not an error.
pub fn remove_dir(dir: impl AsRef<Path>) -> Result<(), MoreFsError> {
    let path_dir = dir.as_ref();
    match fs::remove_dir_all(path_dir) {
        Ok(()) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(MoreFsError::fault(path_dir, e)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Copy

#[derive(Debug, Clone)]
struct SpecCopyTaskFile {
    path_file_src: PathBuf,
    path_file_dst: PathBuf,
}

/// Copy each of `files` into `dir_destination`, keeping relative layout.
///
/// `a/b.txt` lands on `<dest>/a/b.txt`; absolute sources land on
/// `<dest>/<file name>`. Parent directories are created as needed. Per-file
/// failures are collected in the returned [`ReportCopy`]; only a destination
/// that exists as a non-directory fails the whole call.
pub fn copy_files<I, S, Q>(
    files: I,
    dir_destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, MoreFsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_dst = dir_destination.as_ref();
    if path_dir_dst.exists() && !path_dir_dst.is_dir() {
        return Err(MoreFsError::DestinationNotDirectory(path_dir_dst.into()));
    }

    let mut builder_cp_report = ReportCopyBuilder::default();
    let mut l_tasks_file_copy = Vec::new();
    for file in files {
        let path_file_src = file.as_ref();
        builder_cp_report.add_scanned();
        if !path_file_src.is_file() {
            builder_cp_report.add_warning(format!(
                "Not a regular file, skipped: {}",
                path_file_src.display()
            ));
            builder_cp_report.add_skipped();
            continue;
        }
        let path_file_dst = derive_destination_path(path_file_src, path_dir_dst);
        if spec_cp_options.if_dry_run {
            builder_cp_report.add_skipped();
            continue;
        }
        l_tasks_file_copy.push(SpecCopyTaskFile {
            path_file_src: path_file_src.to_path_buf(),
            path_file_dst,
        });
    }

    let n_workers_max = calculate_worker_limit(spec_cp_options.num_workers_max);
    let run_task = |spec_task: &SpecCopyTaskFile| -> Result<(), String> {
        if let Some(path_parent) = spec_task.path_file_dst.parent() {
            fs::create_dir_all(path_parent).map_err(|e| e.to_string())?;
        }
        copy_file_with_metadata(
            &spec_task.path_file_src,
            &spec_task.path_file_dst,
            spec_cp_options.if_preserve_metadata,
        )
        .map_err(|e| e.to_string())
    };

    let l_results: Vec<Result<(), String>> = if n_workers_max <= 1 {
        l_tasks_file_copy.iter().map(run_task).collect()
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => {
                thread_pool.install(|| l_tasks_file_copy.par_iter().map(run_task).collect())
            }
            Err(e) => {
                builder_cp_report.add_warning(format!(
                    "Failed to build thread pool ({e}); copying serially"
                ));
                l_tasks_file_copy.iter().map(run_task).collect()
            }
        }
    };

    for (spec_task, res_copy) in l_tasks_file_copy.into_iter().zip(l_results) {
        match res_copy {
            Ok(()) => builder_cp_report.add_copied(),
            Err(msg) => builder_cp_report.add_error(spec_task.path_file_dst, msg),
        }
    }
    Ok(builder_cp_report.build())
}

fn derive_destination_path(path_file_src: &Path, path_dir_dst: &Path) -> PathBuf {
    if path_file_src.is_absolute() {
        return path_dir_dst.join(path_file_src.file_name().unwrap_or_default());
    }
    let path_rel: PathBuf = path_file_src
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect();
    path_dir_dst.join(path_rel)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
