//! Recursive directory expansion into a flat, filtered file list.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::resolver::is_not_found;
use crate::spec::{MoreFsError, SpecExpandOptions};
use crate::util::SpecPathFilter;

/// Expand `paths` into a flat list of non-directory paths.
///
/// Directories are replaced, depth-first, by the expansion of their children
/// (sorted by name, each joined onto the parent path). Everything else,
/// including paths that do not exist, is kept when it passes the
/// include/exclude filter. Patterns are compiled before touching the
/// filesystem, so a malformed pattern fails with
/// [`MoreFsError::InvalidArgument`] without any IO.
pub fn expand_directory<I, S>(
    paths: I,
    spec_expand_options: &SpecExpandOptions,
) -> Result<Vec<String>, MoreFsError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let spec_filter = SpecPathFilter::from_raw(
        spec_expand_options.pattern_include.as_deref(),
        spec_expand_options.pattern_exclude.as_deref(),
        spec_expand_options.rule_pattern,
    )?;

    let mut l_output = Vec::new();
    let mut set_ancestors = HashSet::new();
    for path in paths {
        walk_path(path.as_ref(), &spec_filter, &mut set_ancestors, &mut l_output)?;
    }
    tracing::debug!(n_files = l_output.len(), "directory expansion done");
    Ok(l_output)
}

/// `(dev, ino)` of a directory, used to detect symlink loops.
#[cfg(unix)]
fn dir_identifier(meta: &fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn dir_identifier(_meta: &fs::Metadata) -> Option<(u64, u64)> {
    None
}

fn walk_path(
    path: &str,
    spec_filter: &SpecPathFilter,
    set_ancestors: &mut HashSet<(u64, u64)>,
    l_output: &mut Vec<String>,
) -> Result<(), MoreFsError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => Some(meta),
        Err(e) if is_not_found(&e) => None,
        Err(e) => return Err(MoreFsError::fault(path, e)),
    };

    let meta = match meta {
        Some(meta) if meta.is_dir() => meta,
        _ => {
            if spec_filter.should_include(path) {
                l_output.push(path.to_string());
            }
            return Ok(());
        }
    };

    // Only directories on the current descent path count, so a directory
    // reached twice through sibling links is still listed twice.
    let tuple_dir_identifier = dir_identifier(&meta);
    if let Some(tuple_id) = tuple_dir_identifier {
        if !set_ancestors.insert(tuple_id) {
            tracing::warn!(path, "symlink loop detected, directory skipped");
            return Ok(());
        }
    }

    let res_walk = walk_children(path, spec_filter, set_ancestors, l_output);
    if let Some(tuple_id) = tuple_dir_identifier {
        set_ancestors.remove(&tuple_id);
    }
    res_walk
}

fn walk_children(
    path: &str,
    spec_filter: &SpecPathFilter,
    set_ancestors: &mut HashSet<(u64, u64)>,
    l_output: &mut Vec<String>,
) -> Result<(), MoreFsError> {
    let iter_entries = fs::read_dir(path).map_err(|e| MoreFsError::fault(path, e))?;
    let mut l_names = Vec::new();
    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| MoreFsError::fault(path, e))?;
        l_names.push(entry.file_name());
    }
    l_names.sort();

    for name in l_names {
        let path_child = Path::new(path).join(name);
        walk_path(&path_child.to_string_lossy(), spec_filter, set_ancestors, l_output)?;
    }
    Ok(())
}
